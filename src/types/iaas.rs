// ABOUTME: IaaS backend identifier with the per-backend director overlay table.
// ABOUTME: Unknown backends are carried through verbatim and contribute no overlays.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unsupported IaaS \"{0}\" (expected one of: aws, gcp, azure)")]
pub struct UnsupportedIaas(pub String);

/// The infrastructure backend an environment is provisioned on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Iaas {
    Aws,
    Gcp,
    Azure,
    /// A backend this build has no overlays for.
    Other(String),
}

impl Iaas {
    pub const SUPPORTED: [Iaas; 3] = [Iaas::Aws, Iaas::Gcp, Iaas::Azure];

    pub fn as_str(&self) -> &str {
        match self {
            Iaas::Aws => "aws",
            Iaas::Gcp => "gcp",
            Iaas::Azure => "azure",
            Iaas::Other(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Iaas::Other(_))
    }

    /// Backend-specific director overlays, in the order they are applied.
    pub fn director_overlays(&self) -> Vec<String> {
        match self {
            Iaas::Aws => vec![
                "aws-bosh-director-ephemeral-ip-ops.yml".to_string(),
                "iam-instance-profile.yml".to_string(),
                "aws-bosh-director-encrypt-disk-ops.yml".to_string(),
            ],
            Iaas::Gcp => vec!["gcp-bosh-director-ephemeral-ip-ops.yml".to_string()],
            Iaas::Azure | Iaas::Other(_) => Vec::new(),
        }
    }
}

impl From<String> for Iaas {
    fn from(value: String) -> Self {
        match value.as_str() {
            "aws" => Iaas::Aws,
            "gcp" => Iaas::Gcp,
            "azure" => Iaas::Azure,
            _ => Iaas::Other(value),
        }
    }
}

impl From<&str> for Iaas {
    fn from(value: &str) -> Self {
        Iaas::from(value.to_string())
    }
}

impl From<Iaas> for String {
    fn from(value: Iaas) -> Self {
        value.as_str().to_string()
    }
}

/// Strict parsing for user input; only supported backends are accepted.
impl FromStr for Iaas {
    type Err = UnsupportedIaas;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Iaas::from(s.trim().to_lowercase()) {
            Iaas::Other(name) => Err(UnsupportedIaas(name)),
            iaas => Ok(iaas),
        }
    }
}

impl fmt::Display for Iaas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_variants() {
        assert_eq!(Iaas::from("aws"), Iaas::Aws);
        assert_eq!(Iaas::from("gcp"), Iaas::Gcp);
        assert_eq!(Iaas::from("azure"), Iaas::Azure);
        assert_eq!(Iaas::from("vsphere"), Iaas::Other("vsphere".to_string()));
    }

    #[test]
    fn strict_parse_rejects_unknown_backends() {
        assert_eq!("AWS".parse::<Iaas>().unwrap(), Iaas::Aws);
        let err = "openstack".parse::<Iaas>().unwrap_err();
        assert!(err.to_string().contains("openstack"));
    }

    #[test]
    fn overlay_table_per_backend() {
        assert_eq!(Iaas::Gcp.director_overlays().len(), 1);
        assert_eq!(
            Iaas::Aws.director_overlays(),
            vec![
                "aws-bosh-director-ephemeral-ip-ops.yml",
                "iam-instance-profile.yml",
                "aws-bosh-director-encrypt-disk-ops.yml",
            ]
        );
        assert!(Iaas::Azure.director_overlays().is_empty());
        assert!(Iaas::from("vsphere").director_overlays().is_empty());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Iaas::Gcp).unwrap();
        assert_eq!(json, "\"gcp\"");
        let other: Iaas = serde_json::from_str("\"vsphere\"").unwrap();
        assert_eq!(other.as_str(), "vsphere");
    }
}
