// ABOUTME: Builds create-env/delete-env arguments from a base manifest and ordered overlays.
// ABOUTME: Paths are emitted relative to ${BBL_STATE_DIR} so scripts survive a moved state dir.

use super::artifacts::Role;
use super::error::ExecutorError;
use crate::types::Iaas;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Variable the generated scripts read to locate the state directory.
pub const STATE_DIR_VAR: &str = "BBL_STATE_DIR";

/// Where a caller-supplied ops-file is materialized inside the vars directory.
pub const USER_OPS_FILE: &str = "user-ops-file.yml";

/// Everything needed to render one role's scripts. Built fresh per call.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolateInput {
    pub deployment_dir: PathBuf,
    pub vars_dir: PathBuf,
    pub state_dir: PathBuf,
    pub iaas: Iaas,
    /// Previous create-env state, written back to the role's `--state` file.
    pub bosh_state: Map<String, Value>,
    /// Previous vars-store contents.
    pub variables: String,
    /// User ops-file content; applied last, director only.
    pub ops_file: String,
}

impl InterpolateInput {
    /// Input using the standard `deployment/` and `vars/` layout under `state_dir`.
    pub fn new(state_dir: impl Into<PathBuf>, iaas: Iaas) -> Self {
        let state_dir = state_dir.into();
        Self {
            deployment_dir: state_dir.join("deployment"),
            vars_dir: state_dir.join("vars"),
            state_dir,
            iaas,
            bosh_state: Map::new(),
            variables: String::new(),
            ops_file: String::new(),
        }
    }

    /// Render `path` relative to the state-dir placeholder.
    ///
    /// Paths outside the state directory are emitted as-is.
    pub fn portable(&self, path: &Path) -> String {
        match path.strip_prefix(&self.state_dir) {
            Ok(rel) if rel.as_os_str().is_empty() => format!("${{{STATE_DIR_VAR}}}"),
            Ok(rel) => format!("${{{STATE_DIR_VAR}}}/{}", rel.display()),
            Err(_) => path.display().to_string(),
        }
    }

    fn has_user_ops(&self, role: Role) -> bool {
        role == Role::Director && !self.ops_file.is_empty()
    }
}

/// Ordered overlay paths for `role`, placeholder-relative.
pub fn overlay_paths(role: Role, input: &InterpolateInput) -> Vec<String> {
    let mut overlays: Vec<String> = role
        .overlays(&input.iaas)
        .iter()
        .map(|overlay| input.portable(&input.deployment_dir.join(overlay)))
        .collect();

    if input.has_user_ops(role) {
        overlays.push(input.portable(&input.vars_dir.join(USER_OPS_FILE)));
    }

    overlays
}

/// Arguments shared by the create and delete scripts of `role`:
/// manifest, `--state`, `--vars-store`, `--vars-file`, then `-o` per overlay.
pub fn create_env_args(role: Role, input: &InterpolateInput) -> Vec<String> {
    let mut args = vec![
        input.portable(&input.deployment_dir.join(role.manifest())),
        "--state".to_string(),
        input.portable(&input.vars_dir.join(role.state_file())),
        "--vars-store".to_string(),
        input.portable(&input.vars_dir.join(role.vars_store_file())),
        "--vars-file".to_string(),
        input.portable(&input.vars_dir.join(role.deployment_vars_file())),
    ];

    for overlay in overlay_paths(role, input) {
        args.push("-o".to_string());
        args.push(overlay);
    }

    args
}

/// Write the files the arguments reference but the caller supplies as content:
/// the user ops-file, the previous create-env state and the previous vars-store.
pub fn materialize(role: Role, input: &InterpolateInput) -> Result<(), ExecutorError> {
    fs::create_dir_all(&input.vars_dir)
        .map_err(|source| ExecutorError::io("create directory", &input.vars_dir, source))?;

    if input.has_user_ops(role) {
        write(&input.vars_dir.join(USER_OPS_FILE), input.ops_file.as_bytes())?;
    }

    if !input.bosh_state.is_empty() {
        let json = serde_json::to_vec(&input.bosh_state).map_err(ExecutorError::Serialize)?;
        write(&input.vars_dir.join(role.state_file()), &json)?;
    }

    if !input.variables.is_empty() {
        write(
            &input.vars_dir.join(role.vars_store_file()),
            input.variables.as_bytes(),
        )?;
    }

    Ok(())
}

fn write(path: &Path, contents: &[u8]) -> Result<(), ExecutorError> {
    tracing::debug!(path = %path.display(), "writing");
    fs::write(path, contents).map_err(|source| ExecutorError::io("write file", path, source))
}
