// ABOUTME: Error types for script generation and create-env/delete-env execution.
// ABOUTME: Keeps "version unparsable" distinct from a failed or missing bosh binary.

use super::command::CommandError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Filesystem failure with the operation and path that hit it.
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A generated script exited non-zero or could not be started.
    #[error("Run {action}: {detail}")]
    Run { action: String, detail: String },

    /// bosh ran but its output carried no recognisable version.
    #[error("BOSH version could not be parsed")]
    VersionUnparsable,

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("serialize bosh state: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ExecutorError {
    pub(crate) fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        ExecutorError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_version_unparsable(&self) -> bool {
        matches!(self, ExecutorError::VersionUnparsable)
    }
}
