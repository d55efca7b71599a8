// ABOUTME: Deployment roles and the artifact set each needs on disk.
// ABOUTME: A role counts as initialized once every required file exists.

use super::interpolate::InterpolateInput;
use crate::types::Iaas;
use std::path::PathBuf;

pub(crate) const CPI_OVERLAY: &str = "cpi.yml";
const DIRECTOR_COMMON_OVERLAYS: [&str; 3] = ["jumpbox-user.yml", "uaa.yml", "credhub.yml"];

/// A deployment bbl stands up with `bosh create-env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Jumpbox,
    Director,
}

impl Role {
    /// Deployment name used for scripts and vars files.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Jumpbox => "jumpbox",
            Role::Director => "director",
        }
    }

    /// Base manifest in the deployment directory.
    pub fn manifest(&self) -> &'static str {
        match self {
            Role::Jumpbox => "jumpbox.yml",
            Role::Director => "bosh.yml",
        }
    }

    /// create-env state file in the vars directory.
    pub fn state_file(&self) -> &'static str {
        match self {
            Role::Jumpbox => "jumpbox-state.json",
            Role::Director => "bosh-state.json",
        }
    }

    pub fn vars_store_file(&self) -> String {
        format!("{}-variables.yml", self.name())
    }

    pub fn deployment_vars_file(&self) -> String {
        format!("{}-deployment-vars.yml", self.name())
    }

    pub fn create_script(&self) -> String {
        format!("create-{}.sh", self.name())
    }

    pub fn delete_script(&self) -> String {
        format!("delete-{}.sh", self.name())
    }

    /// Overlays from the deployment directory, in application order.
    pub fn overlays(&self, iaas: &Iaas) -> Vec<String> {
        let mut overlays = vec![CPI_OVERLAY.to_string()];
        if *self == Role::Director {
            overlays.extend(DIRECTOR_COMMON_OVERLAYS.iter().map(|o| o.to_string()));
            overlays.extend(iaas.director_overlays());
        }
        overlays
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Every file `role` needs: manifest and overlays under the deployment
/// directory, create/delete scripts under the state directory.
pub fn required_artifacts(role: Role, input: &InterpolateInput) -> Vec<PathBuf> {
    let mut paths = vec![input.deployment_dir.join(role.manifest())];
    paths.extend(
        role.overlays(&input.iaas)
            .iter()
            .map(|overlay| input.deployment_dir.join(overlay)),
    );
    paths.push(input.state_dir.join(role.create_script()));
    paths.push(input.state_dir.join(role.delete_script()));
    paths
}

/// True iff every required artifact exists as a file.
pub fn is_initialized(role: Role, input: &InterpolateInput) -> bool {
    required_artifacts(role, input).iter().all(|path| {
        let present = path.is_file();
        if !present {
            tracing::debug!(%role, path = %path.display(), "required artifact missing");
        }
        present
    })
}
