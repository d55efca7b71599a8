// ABOUTME: Global configuration: state directory, IaaS and debug switch.
// ABOUTME: Resolved from CLI flags first, then BBL_* environment variables, then defaults.

use crate::storage::State;
use crate::types::{Iaas, UnsupportedIaas};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const STATE_DIR_ENV: &str = "BBL_STATE_DIR";
pub const IAAS_ENV: &str = "BBL_IAAS";
pub const DEBUG_ENV: &str = "BBL_DEBUG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error(transparent)]
    UnsupportedIaas(#[from] UnsupportedIaas),

    #[error("The iaas type cannot be changed for an existing environment. The current iaas type is {current}.")]
    IaasMismatch { current: Iaas, requested: Iaas },
}

/// Values given on the command line; `None` falls through to the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub state_dir: Option<PathBuf>,
    pub iaas: Option<String>,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub state_dir: PathBuf,
    pub iaas: Option<Iaas>,
    pub debug: bool,
}

impl GlobalConfig {
    pub fn resolve(flags: ConfigFlags) -> Result<Self, ConfigError> {
        let state_dir = match flags
            .state_dir
            .or_else(|| env_value(STATE_DIR_ENV).map(PathBuf::from))
        {
            Some(dir) if dir.is_absolute() => dir,
            // Scripts run from inside the state dir, so a relative path would not resolve there.
            Some(dir) => env::current_dir()
                .map_err(ConfigError::CurrentDir)?
                .join(dir),
            None => env::current_dir().map_err(ConfigError::CurrentDir)?,
        };

        let iaas = flags
            .iaas
            .or_else(|| env_value(IAAS_ENV))
            .map(|name| name.parse::<Iaas>())
            .transpose()?;

        let debug = flags.debug
            || env_value(DEBUG_ENV).is_some_and(|v| !matches!(v.as_str(), "0" | "false"));

        Ok(Self {
            state_dir,
            iaas,
            debug,
        })
    }

    /// Record the configured IaaS in `state`; an environment never changes IaaS.
    pub fn apply_iaas(&self, state: &mut State) -> Result<(), ConfigError> {
        let Some(requested) = &self.iaas else {
            return Ok(());
        };
        match &state.iaas {
            Some(current) if current != requested => Err(ConfigError::IaasMismatch {
                current: current.clone(),
                requested: requested.clone(),
            }),
            _ => {
                state.iaas = Some(requested.clone());
                Ok(())
            }
        }
    }
}

/// Environment variable value, with empty treated as unset.
fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
