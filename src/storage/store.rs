// ABOUTME: Durable storage for State and the state-directory layout.
// ABOUTME: Writes bbl-state.json through a temp file and rename so a crash never truncates it.

use super::state::{STATE_VERSION, State};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATE_FILENAME: &str = "bbl-state.json";

const VARS_DIR: &str = "vars";
const DEPLOYMENT_DIR: &str = "deployment";
const TERRAFORM_DIR: &str = "terraform";
const CLOUD_CONFIG_DIR: &str = "cloud-config";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read state file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write state file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Owns the state directory: the state file plus the vars, deployment,
/// terraform and cloud-config subdirectories.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn state_dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir.join(STATE_FILENAME)
    }

    /// Load the persisted state, or a fresh one if nothing has been written yet.
    pub fn get(&self) -> Result<State, StoreError> {
        let path = self.state_file();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no state file, starting fresh");
            return Ok(State::new());
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse { path, source })
    }

    /// Persist state synchronously.
    pub fn set(&self, state: &State) -> Result<(), StoreError> {
        let mut state = state.clone();
        state.version = STATE_VERSION;

        let json = serde_json::to_string_pretty(&state).map_err(StoreError::Serialize)?;
        self.ensure_dir(&self.dir)?;

        let path = self.state_file();
        let tmp = self.dir.join(format!(".{STATE_FILENAME}.tmp"));
        fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    pub fn vars_dir(&self) -> Result<PathBuf, StoreError> {
        self.subdir(VARS_DIR)
    }

    pub fn deployment_dir(&self) -> Result<PathBuf, StoreError> {
        self.subdir(DEPLOYMENT_DIR)
    }

    pub fn terraform_dir(&self) -> Result<PathBuf, StoreError> {
        self.subdir(TERRAFORM_DIR)
    }

    pub fn cloud_config_dir(&self) -> Result<PathBuf, StoreError> {
        self.subdir(CLOUD_CONFIG_DIR)
    }

    fn subdir(&self, name: &str) -> Result<PathBuf, StoreError> {
        let path = self.dir.join(name);
        self.ensure_dir(&path)?;
        Ok(path)
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(path).map_err(|source| StoreError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }
}
