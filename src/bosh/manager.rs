// ABOUTME: Executor-backed lifecycle for the jumpbox and director deployments.
// ABOUTME: Writes deployment files, generates scripts, runs create/delete-env and records results in State.

use super::artifacts::Role;
use super::command::BoshCommand;
use super::error::ExecutorError;
use super::executor::{CreateEnvInput, DeleteEnvInput, Executor};
use super::interpolate::{self, InterpolateInput};
use super::templates;
use crate::storage::{BoshState, JumpboxState, State, StateStore, StoreError};
use crate::types::{Iaas, UnsupportedIaas};
use serde_json::{Map, Value};
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const INTERNAL_CIDR: &str = "10.0.0.0/24";
const INTERNAL_GW: &str = "10.0.0.1";
const JUMPBOX_INTERNAL_IP: &str = "10.0.0.5";
const DIRECTOR_INTERNAL_IP: &str = "10.0.0.6";
const DIRECTOR_USERNAME: &str = "admin";

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("state has no IaaS")]
    MissingIaas,

    #[error(transparent)]
    UnsupportedIaas(#[from] UnsupportedIaas),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("deployment vars: {0}")]
    DeploymentVars(#[source] serde_yaml::Error),

    #[error("parse {path}: {source}")]
    ParseVarsStore {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("parse {path}: {source}")]
    ParseBoshState {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Stands up and tears down the jumpbox and director for one state directory.
#[derive(Debug, Clone)]
pub struct BoshManager<C> {
    executor: Executor<C>,
    store: StateStore,
}

impl<C: BoshCommand> BoshManager<C> {
    pub fn new(executor: Executor<C>, store: StateStore) -> Self {
        Self { executor, store }
    }

    pub fn executor(&self) -> &Executor<C> {
        &self.executor
    }

    fn interpolate_input(
        &self,
        state: &State,
        role: Role,
    ) -> Result<InterpolateInput, ManagerError> {
        let iaas = state.iaas.clone().ok_or(ManagerError::MissingIaas)?;
        let (bosh_state, variables, ops_file) = match role {
            Role::Jumpbox => (
                state.jumpbox.state.clone(),
                state.jumpbox.variables.clone(),
                String::new(),
            ),
            Role::Director => (
                state.bosh.state.clone(),
                state.bosh.variables.clone(),
                state.bosh.user_ops_file.clone(),
            ),
        };

        Ok(InterpolateInput {
            deployment_dir: self.store.deployment_dir()?,
            vars_dir: self.store.vars_dir()?,
            state_dir: self.store.state_dir().to_path_buf(),
            iaas,
            bosh_state,
            variables,
            ops_file,
        })
    }

    /// Write manifests and overlays, then the create/delete scripts.
    pub fn generate(&self, state: &State, role: Role) -> Result<InterpolateInput, ManagerError> {
        let input = self.interpolate_input(state, role)?;
        write_deployment_files(role, &input.iaas, &input.deployment_dir)?;

        match role {
            Role::Jumpbox => self.executor.jumpbox_create_env_args(&input)?,
            Role::Director => self.executor.director_create_env_args(&input)?,
        }

        Ok(input)
    }

    /// Generate and apply the jumpbox, recording its vars-store and state.
    pub async fn initialize_jumpbox(&self, mut state: State) -> Result<State, ManagerError> {
        let input = self.generate(&state, Role::Jumpbox)?;
        let deployment_vars = deployment_vars(&state, Role::Jumpbox)?;

        let variables = self
            .executor
            .create_env(&CreateEnvInput {
                deployment: Role::Jumpbox.name().to_string(),
                deployment_vars,
                vars_dir: input.vars_dir.clone(),
                state_dir: input.state_dir.clone(),
            })
            .await?;

        state.jumpbox = JumpboxState {
            url: format!("{}:22", external_ip(&state).unwrap_or(JUMPBOX_INTERNAL_IP)),
            variables,
            manifest: templates::JUMPBOX_MANIFEST.to_string(),
            state: read_bosh_state(&input.vars_dir.join(Role::Jumpbox.state_file()))?,
        };

        tracing::info!(url = %state.jumpbox.url, "jumpbox created");
        Ok(state)
    }

    /// Generate and apply the director, recording credentials from its vars-store.
    pub async fn initialize_director(&self, mut state: State) -> Result<State, ManagerError> {
        let input = self.generate(&state, Role::Director)?;
        let deployment_vars = deployment_vars(&state, Role::Director)?;

        let variables = self
            .executor
            .create_env(&CreateEnvInput {
                deployment: Role::Director.name().to_string(),
                deployment_vars,
                vars_dir: input.vars_dir.clone(),
                state_dir: input.state_dir.clone(),
            })
            .await?;

        let vars_store = input.vars_dir.join(Role::Director.vars_store_file());
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(&variables).map_err(|source| ManagerError::ParseVarsStore {
                path: vars_store,
                source,
            })?;
        let lookup = |v: &serde_yaml::Value| v.as_str().unwrap_or_default().to_string();

        state.bosh = BoshState {
            director_name: director_name(&state),
            director_username: DIRECTOR_USERNAME.to_string(),
            director_password: lookup(&parsed["admin_password"]),
            director_address: format!("https://{}:25555", director_ip(&state)),
            director_ssl_ca: lookup(&parsed["director_ssl"]["ca"]),
            variables,
            state: read_bosh_state(&input.vars_dir.join(Role::Director.state_file()))?,
            manifest: templates::DIRECTOR_MANIFEST.to_string(),
            user_ops_file: state.bosh.user_ops_file.clone(),
        };

        tracing::info!(address = %state.bosh.director_address, "director created");
        Ok(state)
    }

    /// Run `delete-director.sh` if it was generated, then clear the director state.
    pub async fn delete_director(&self, state: State) -> Result<State, ManagerError> {
        self.delete(state, Role::Director).await
    }

    /// Run `delete-jumpbox.sh` if it was generated, then clear the jumpbox state.
    pub async fn delete_jumpbox(&self, state: State) -> Result<State, ManagerError> {
        self.delete(state, Role::Jumpbox).await
    }

    async fn delete(&self, mut state: State, role: Role) -> Result<State, ManagerError> {
        let input = self.interpolate_input(&state, role)?;
        let initialized = match role {
            Role::Jumpbox => self.executor.is_jumpbox_initialized(&input),
            Role::Director => self.executor.is_director_initialized(&input),
        };
        if !initialized {
            tracing::info!(%role, "no scripts generated, nothing to delete");
        } else {
            // Refresh state and vars-store so delete-env sees the last create-env result.
            interpolate::materialize(role, &input)?;
            self.executor
                .delete_env(&DeleteEnvInput {
                    deployment: role.name().to_string(),
                    deployment_vars: deployment_vars(&state, role)?,
                    vars_dir: input.vars_dir,
                    state_dir: input.state_dir,
                })
                .await?;
            tracing::info!(%role, "deleted");
        }

        match role {
            Role::Jumpbox => state.jumpbox = JumpboxState::default(),
            Role::Director => state.bosh = BoshState::default(),
        }
        Ok(state)
    }
}

fn write_deployment_files(role: Role, iaas: &Iaas, dir: &Path) -> Result<(), ManagerError> {
    for (name, contents) in templates::deployment_files(role, iaas)? {
        let path = dir.join(&name);
        fs::write(&path, contents).map_err(|source| ManagerError::Io {
            op: "write file",
            path,
            source,
        })?;
    }
    Ok(())
}

/// Read the state create-env left behind; absent means nothing was deployed.
fn read_bosh_state(path: &Path) -> Result<Map<String, Value>, ManagerError> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(Map::new()),
        Ok(content) => serde_json::from_str(&content).map_err(|source| {
            ManagerError::ParseBoshState {
                path: path.to_path_buf(),
                source,
            }
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
        Err(source) => Err(ManagerError::Io {
            op: "read file",
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn director_name(state: &State) -> String {
    format!("bosh-{}", state.env_id)
}

fn output_str<'a>(state: &'a State, key: &str) -> Option<&'a str> {
    state.latest_tf_output.get(key).and_then(Value::as_str)
}

fn external_ip(state: &State) -> Option<&str> {
    output_str(state, "jumpbox__external_ip").or_else(|| output_str(state, "external_ip"))
}

fn director_ip(state: &State) -> &str {
    output_str(state, "director__internal_ip").unwrap_or(DIRECTOR_INTERNAL_IP)
}

/// YAML handed to `--vars-file`: network defaults overlaid with terraform outputs.
pub fn deployment_vars(state: &State, role: Role) -> Result<String, ManagerError> {
    let mut vars = Mapping::new();
    let mut set = |key: &str, value: serde_yaml::Value| {
        vars.insert(serde_yaml::Value::from(key), value);
    };

    set("director_name", director_name(state).into());
    set("internal_cidr", INTERNAL_CIDR.into());
    set("internal_gw", INTERNAL_GW.into());
    match role {
        Role::Jumpbox => {
            set("internal_ip", JUMPBOX_INTERNAL_IP.into());
            if let Some(ip) = external_ip(state) {
                set("external_ip", ip.into());
            }
        }
        Role::Director => set("internal_ip", director_ip(state).into()),
    }

    for (key, value) in &state.latest_tf_output {
        let value = serde_yaml::to_value(value).map_err(ManagerError::DeploymentVars)?;
        set(key, value);
    }

    serde_yaml::to_string(&vars).map_err(ManagerError::DeploymentVars)
}
