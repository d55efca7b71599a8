// ABOUTME: Argument parsing and fast-fail validation shared by `plan` and `up`.
// ABOUTME: Fast fails run before any state is written or infrastructure touched.

use crate::bosh::{BoshCommand, Executor, ExecutorError};
use crate::storage::State;
use async_trait::async_trait;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Oldest BOSH CLI that understands the generated scripts.
pub const MINIMUM_BOSH_VERSION: &str = "2.0.24";

#[derive(Debug, Error)]
pub enum UpError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("--iaas [gcp, aws, azure] must be provided or BBL_IAAS must be set")]
    MissingIaas,

    #[error("The director name cannot be changed for an existing environment. Current name is {current}.")]
    NameChange { current: String, requested: String },

    #[error("--ops-file cannot be used with an environment created with --no-director")]
    OpsFileWithoutDirector,

    #[error("BOSH version must be at least v2.0.24, found v{found}")]
    BoshTooOld { found: String },

    #[error("BOSH version: {0}")]
    Version(#[source] ExecutorError),

    #[error("read ops file {path}: {source}")]
    ReadOpsFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Flags accepted after `plan` / `up`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
pub struct UpConfig {
    /// Name to assign to the environment
    #[arg(long, default_value = "")]
    pub name: String,

    /// Provision infrastructure and jumpbox settings only, no director
    #[arg(long)]
    pub no_director: bool,

    /// Ops-file applied last to the director manifest
    #[arg(long, conflicts_with = "no_director")]
    pub ops_file: Option<PathBuf>,
}

impl UpConfig {
    /// Content of `--ops-file`, if one was given.
    pub fn read_ops_file(&self) -> Result<Option<String>, UpError> {
        let Some(path) = &self.ops_file else {
            return Ok(None);
        };
        fs::read_to_string(path)
            .map(Some)
            .map_err(|source| UpError::ReadOpsFile {
                path: path.clone(),
                source,
            })
    }
}

/// Reports the installed BOSH CLI version.
#[async_trait]
pub trait BoshVersion: Send + Sync {
    async fn version(&self) -> Result<String, ExecutorError>;
}

#[async_trait]
impl<C: BoshCommand> BoshVersion for Executor<C> {
    async fn version(&self) -> Result<String, ExecutorError> {
        Executor::version(self).await
    }
}

/// Validates `up` arguments against the current state.
#[derive(Debug, Clone)]
pub struct Up<V> {
    bosh: V,
}

impl<V: BoshVersion> Up<V> {
    pub fn new(bosh: V) -> Self {
        Self { bosh }
    }

    pub fn parse_args(&self, args: &[String], _state: &State) -> Result<UpConfig, UpError> {
        Ok(UpConfig::try_parse_from(args)?)
    }

    pub async fn check_fast_fails(&self, config: &UpConfig, state: &State) -> Result<(), UpError> {
        if state.iaas.is_none() {
            return Err(UpError::MissingIaas);
        }

        if !config.name.is_empty() && !state.env_id.is_empty() && config.name != state.env_id {
            return Err(UpError::NameChange {
                current: state.env_id.clone(),
                requested: config.name.clone(),
            });
        }

        if state.no_director && config.ops_file.is_some() {
            return Err(UpError::OpsFileWithoutDirector);
        }

        if config.no_director || state.no_director {
            return Ok(());
        }

        match self.bosh.version().await {
            Ok(found) if !at_least(&found, MINIMUM_BOSH_VERSION) => {
                Err(UpError::BoshTooOld { found })
            }
            Ok(_) => Ok(()),
            Err(e) if e.is_version_unparsable() => {
                tracing::debug!("bosh version unparsable, skipping minimum version check");
                Ok(())
            }
            Err(e) => Err(UpError::Version(e)),
        }
    }
}

fn version_parts(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or_default())
        .collect()
}

fn at_least(found: &str, minimum: &str) -> bool {
    version_parts(found) >= version_parts(minimum)
}
