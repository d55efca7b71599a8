// ABOUTME: Generates per-role create/delete scripts and runs them.
// ABOUTME: BBL_STATE_DIR is handed to each script through its own environment, never set process-wide.

use super::artifacts::{self, Role};
use super::command::{BoshCommand, exit_detail};
use super::error::ExecutorError;
use super::interpolate::{self, InterpolateInput, STATE_DIR_VAR};
use super::script::{self, Action};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"version (\d+\.\d+\.\d+)").expect("Invalid version regex"));

/// Input for running a previously generated create script.
#[derive(Debug, Clone)]
pub struct CreateEnvInput {
    /// Deployment name; selects `create-<deployment>.sh`.
    pub deployment: String,
    /// Written to `<vars_dir>/<deployment>-deployment-vars.yml` first.
    pub deployment_vars: String,
    pub vars_dir: PathBuf,
    pub state_dir: PathBuf,
}

/// Input for running a previously generated delete script.
#[derive(Debug, Clone)]
pub struct DeleteEnvInput {
    pub deployment: String,
    pub deployment_vars: String,
    pub vars_dir: PathBuf,
    pub state_dir: PathBuf,
}

/// Turns an [`InterpolateInput`] into scripts on disk and runs them.
///
/// Scripts are run one at a time; the caller owns sequencing.
#[derive(Debug, Clone)]
pub struct Executor<C> {
    command: C,
}

impl<C: BoshCommand> Executor<C> {
    pub fn new(command: C) -> Self {
        Self { command }
    }

    pub fn is_jumpbox_initialized(&self, input: &InterpolateInput) -> bool {
        artifacts::is_initialized(Role::Jumpbox, input)
    }

    pub fn is_director_initialized(&self, input: &InterpolateInput) -> bool {
        artifacts::is_initialized(Role::Director, input)
    }

    /// Write `create-jumpbox.sh` and `delete-jumpbox.sh`.
    pub fn jumpbox_create_env_args(&self, input: &InterpolateInput) -> Result<(), ExecutorError> {
        self.write_scripts(Role::Jumpbox, input)
    }

    /// Write `create-director.sh` and `delete-director.sh`.
    ///
    /// Whether a director is wanted at all is the caller's decision.
    pub fn director_create_env_args(&self, input: &InterpolateInput) -> Result<(), ExecutorError> {
        self.write_scripts(Role::Director, input)
    }

    fn write_scripts(&self, role: Role, input: &InterpolateInput) -> Result<(), ExecutorError> {
        interpolate::materialize(role, input)?;

        let args = interpolate::create_env_args(role, input);
        let bosh_path = self.command.bosh_path()?;

        // Both scripts come from the same args so delete always targets what create produced.
        for (action, name) in [
            (Action::CreateEnv, role.create_script()),
            (Action::DeleteEnv, role.delete_script()),
        ] {
            let path = input.state_dir.join(name);
            let contents = script::generate(action, &bosh_path, &args);
            write_executable(&path, &contents)?;
        }

        tracing::info!(%role, state_dir = %input.state_dir.display(), "generated create-env scripts");
        Ok(())
    }

    /// Run `create-<deployment>.sh` and return the resulting vars-store.
    pub async fn create_env(&self, input: &CreateEnvInput) -> Result<String, ExecutorError> {
        self.run_script(
            Action::CreateEnv,
            &input.deployment,
            &input.deployment_vars,
            &input.vars_dir,
            &input.state_dir,
        )
        .await?;

        let vars_store = input
            .vars_dir
            .join(format!("{}-variables.yml", input.deployment));
        fs::read_to_string(&vars_store)
            .map_err(|source| ExecutorError::io("read file", &vars_store, source))
    }

    /// Run `delete-<deployment>.sh`.
    pub async fn delete_env(&self, input: &DeleteEnvInput) -> Result<(), ExecutorError> {
        self.run_script(
            Action::DeleteEnv,
            &input.deployment,
            &input.deployment_vars,
            &input.vars_dir,
            &input.state_dir,
        )
        .await
    }

    async fn run_script(
        &self,
        action: Action,
        deployment: &str,
        deployment_vars: &str,
        vars_dir: &Path,
        state_dir: &Path,
    ) -> Result<(), ExecutorError> {
        let vars_file = vars_dir.join(format!("{deployment}-deployment-vars.yml"));
        fs::write(&vars_file, deployment_vars)
            .map_err(|source| ExecutorError::io("write file", &vars_file, source))?;

        let prefix = match action {
            Action::CreateEnv => "create",
            Action::DeleteEnv => "delete",
        };
        let script = state_dir.join(format!("{prefix}-{deployment}.sh"));
        let label = format!("bosh {action}");

        tracing::info!(%deployment, script = %script.display(), "running bosh {action}");
        let status = Command::new(&script)
            .env(STATE_DIR_VAR, state_dir)
            .current_dir(state_dir)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| ExecutorError::Run {
                action: label.clone(),
                detail: e.to_string(),
            })?;

        if !status.success() {
            let detail = exit_detail(&status);
            tracing::warn!(%deployment, %detail, "bosh {action} failed");
            return Err(ExecutorError::Run {
                action: label,
                detail,
            });
        }

        Ok(())
    }

    /// The installed BOSH CLI version, e.g. `2.0.24`.
    pub async fn version(&self) -> Result<String, ExecutorError> {
        let stdout = self.command.run(None, &["-v".to_string()]).await?;
        VERSION_REGEX
            .captures(&stdout)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ExecutorError::VersionUnparsable)
    }
}

fn write_executable(path: &Path, contents: &str) -> Result<(), ExecutorError> {
    fs::write(path, contents).map_err(|source| ExecutorError::io("write file", path, source))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o750))
            .map_err(|source| ExecutorError::io("chmod", path, source))?;
    }

    Ok(())
}
