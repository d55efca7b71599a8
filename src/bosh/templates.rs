// ABOUTME: Deployment manifests and overlays embedded at compile time.
// ABOUTME: Resolved per role and IaaS into (file name, contents) pairs for the deployment dir.

use super::artifacts::{CPI_OVERLAY, Role};
use crate::types::{Iaas, UnsupportedIaas};

pub static JUMPBOX_MANIFEST: &str = include_str!("templates/jumpbox.yml");
pub static DIRECTOR_MANIFEST: &str = include_str!("templates/bosh.yml");

pub static JUMPBOX_USER: &str = include_str!("templates/jumpbox-user.yml");
pub static UAA: &str = include_str!("templates/uaa.yml");
pub static CREDHUB: &str = include_str!("templates/credhub.yml");

pub static AWS_CPI: &str = include_str!("templates/aws/cpi.yml");
pub static GCP_CPI: &str = include_str!("templates/gcp/cpi.yml");
pub static AZURE_CPI: &str = include_str!("templates/azure/cpi.yml");

pub static AWS_EPHEMERAL_IP: &str = include_str!("templates/aws/bosh-director-ephemeral-ip-ops.yml");
pub static AWS_IAM_INSTANCE_PROFILE: &str = include_str!("templates/aws/iam-instance-profile.yml");
pub static AWS_ENCRYPT_DISK: &str = include_str!("templates/aws/bosh-director-encrypt-disk-ops.yml");
pub static GCP_EPHEMERAL_IP: &str = include_str!("templates/gcp/bosh-director-ephemeral-ip-ops.yml");

/// Overlay contents by deployment-dir file name.
const OVERLAYS: &[(&str, &str)] = &[
    ("jumpbox-user.yml", JUMPBOX_USER),
    ("uaa.yml", UAA),
    ("credhub.yml", CREDHUB),
    ("aws-bosh-director-ephemeral-ip-ops.yml", AWS_EPHEMERAL_IP),
    ("iam-instance-profile.yml", AWS_IAM_INSTANCE_PROFILE),
    ("aws-bosh-director-encrypt-disk-ops.yml", AWS_ENCRYPT_DISK),
    ("gcp-bosh-director-ephemeral-ip-ops.yml", GCP_EPHEMERAL_IP),
];

fn cpi(iaas: &Iaas) -> Result<&'static str, UnsupportedIaas> {
    match iaas {
        Iaas::Aws => Ok(AWS_CPI),
        Iaas::Gcp => Ok(GCP_CPI),
        Iaas::Azure => Ok(AZURE_CPI),
        Iaas::Other(name) => Err(UnsupportedIaas(name.clone())),
    }
}

/// Manifest plus every overlay `role` applies on `iaas`.
pub fn deployment_files(
    role: Role,
    iaas: &Iaas,
) -> Result<Vec<(String, &'static str)>, UnsupportedIaas> {
    let manifest = match role {
        Role::Jumpbox => JUMPBOX_MANIFEST,
        Role::Director => DIRECTOR_MANIFEST,
    };
    let mut files = vec![(role.manifest().to_string(), manifest)];

    for overlay in role.overlays(iaas) {
        let contents = if overlay == CPI_OVERLAY {
            cpi(iaas)?
        } else {
            OVERLAYS
                .iter()
                .find(|(name, _)| *name == overlay)
                .map(|(_, contents)| *contents)
                .ok_or_else(|| UnsupportedIaas(iaas.to_string()))?
        };
        files.push((overlay, contents));
    }

    Ok(files)
}
