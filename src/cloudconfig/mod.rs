// ABOUTME: Cloud-config manager: writes the base cloud-config, its IaaS ops-file and vars.
// ABOUTME: Files land in cloud-config/ for `bosh update-cloud-config` to consume.

use crate::storage::{State, StateStore, StoreError};
use crate::types::{Iaas, UnsupportedIaas};
use serde_yaml::Mapping;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub const CLOUD_CONFIG_FILE: &str = "cloud-config.yml";
pub const OPS_FILE: &str = "ops.yml";
pub const VARS_FILE: &str = "vars.yml";

static BASE: &str = include_str!("templates/cloud-config.yml");
static AWS_OPS: &str = include_str!("templates/aws-ops.yml");
static GCP_OPS: &str = include_str!("templates/gcp-ops.yml");
static AZURE_OPS: &str = include_str!("templates/azure-ops.yml");

const INTERNAL_CIDR: &str = "10.0.0.0/24";
const INTERNAL_GW: &str = "10.0.0.1";

#[derive(Debug, Error)]
pub enum CloudConfigError {
    #[error("state has no IaaS")]
    MissingIaas,

    #[error(transparent)]
    UnsupportedIaas(#[from] UnsupportedIaas),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("write file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cloud-config vars: {0}")]
    Vars(#[source] serde_yaml::Error),
}

#[derive(Debug, Clone)]
pub struct CloudConfigManager {
    store: StateStore,
}

impl CloudConfigManager {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Write `cloud-config.yml`, `ops.yml` and `vars.yml` for the environment.
    pub fn initialize(&self, state: &State) -> Result<(), CloudConfigError> {
        let iaas = state.iaas.as_ref().ok_or(CloudConfigError::MissingIaas)?;
        let dir = self.store.cloud_config_dir()?;
        let vars = vars(state)?;

        for (name, contents) in [
            (CLOUD_CONFIG_FILE, BASE),
            (OPS_FILE, ops(iaas)?),
            (VARS_FILE, vars.as_str()),
        ] {
            let path = dir.join(name);
            fs::write(&path, contents)
                .map_err(|source| CloudConfigError::Write { path, source })?;
        }

        tracing::info!(dir = %dir.display(), %iaas, "cloud-config written");
        Ok(())
    }
}

fn ops(iaas: &Iaas) -> Result<&'static str, UnsupportedIaas> {
    match iaas {
        Iaas::Aws => Ok(AWS_OPS),
        Iaas::Gcp => Ok(GCP_OPS),
        Iaas::Azure => Ok(AZURE_OPS),
        Iaas::Other(name) => Err(UnsupportedIaas(name.clone())),
    }
}

/// Network defaults, overridden by any terraform output of the same name.
fn vars(state: &State) -> Result<String, CloudConfigError> {
    let mut vars = Mapping::new();
    vars.insert("internal_cidr".into(), INTERNAL_CIDR.into());
    vars.insert("internal_gw".into(), INTERNAL_GW.into());
    for (key, value) in &state.latest_tf_output {
        let value = serde_yaml::to_value(value).map_err(CloudConfigError::Vars)?;
        vars.insert(key.as_str().into(), value);
    }
    serde_yaml::to_string(&vars).map_err(CloudConfigError::Vars)
}
