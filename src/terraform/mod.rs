// ABOUTME: Infrastructure-provisioning manager backed by the terraform CLI.
// ABOUTME: Writes the IaaS template and tfvars into terraform/, then runs `terraform init` there.

use crate::bosh::CommandError;
use crate::storage::{State, StateStore, StoreError};
use crate::types::{Iaas, UnsupportedIaas};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

pub const TEMPLATE_FILE: &str = "bbl-template.tf";
pub const VARS_FILE: &str = "terraform.tfvars";

static AWS_TEMPLATE: &str = include_str!("templates/aws.tf");
static GCP_TEMPLATE: &str = include_str!("templates/gcp.tf");
static AZURE_TEMPLATE: &str = include_str!("templates/azure.tf");

#[derive(Debug, Error)]
pub enum TerraformError {
    #[error("state has no IaaS")]
    MissingIaas,

    #[error(transparent)]
    UnsupportedIaas(#[from] UnsupportedIaas),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Prepares the terraform working directory for an environment.
#[derive(Debug, Clone)]
pub struct TerraformManager {
    store: StateStore,
    binary: PathBuf,
}

impl TerraformManager {
    /// Use `terraform` from PATH.
    pub fn new(store: StateStore) -> Self {
        Self::with_binary(store, "terraform")
    }

    pub fn with_binary(store: StateStore, binary: impl Into<PathBuf>) -> Self {
        Self {
            store,
            binary: binary.into(),
        }
    }

    /// Write the template and tfvars, then run `terraform init`.
    pub async fn init(&self, state: &State) -> Result<(), TerraformError> {
        let iaas = state.iaas.as_ref().ok_or(TerraformError::MissingIaas)?;
        let dir = self.store.terraform_dir()?;

        write(&dir.join(TEMPLATE_FILE), template(iaas)?)?;
        write(&dir.join(VARS_FILE), &tfvars(state))?;

        self.run(&dir, &["init"]).await
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<(), TerraformError> {
        let program = self.binary.display().to_string();
        tracing::info!(%program, ?args, dir = %dir.display(), "running terraform");

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match output.status.code() {
                Some(code) => format!("exit status {code}"),
                None => "terminated".to_string(),
            };
            tracing::warn!(%program, %detail, "terraform failed");
            return Err(CommandError::Failed {
                program,
                args: args.join(" "),
                detail: format!("{detail}: {}", stderr.trim()),
            }
            .into());
        }

        Ok(())
    }
}

fn template(iaas: &Iaas) -> Result<&'static str, UnsupportedIaas> {
    match iaas {
        Iaas::Aws => Ok(AWS_TEMPLATE),
        Iaas::Gcp => Ok(GCP_TEMPLATE),
        Iaas::Azure => Ok(AZURE_TEMPLATE),
        Iaas::Other(name) => Err(UnsupportedIaas(name.clone())),
    }
}

fn tfvars(state: &State) -> String {
    format!("env_id = \"{}\"\n", state.env_id)
}

fn write(path: &Path, contents: &str) -> Result<(), TerraformError> {
    fs::write(path, contents).map_err(|source| TerraformError::Io {
        op: "write file",
        path: path.to_path_buf(),
        source,
    })
}
