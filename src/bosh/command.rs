// ABOUTME: Capability trait for locating and running the BOSH CLI.
// ABOUTME: BoshCli is the tokio-process implementation; tests substitute their own.

use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Binary names searched on PATH, in order.
const BOSH_BINARIES: [&str; 2] = ["bosh2", "bosh"];

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("bosh cli not found on PATH (looked for bosh2, bosh)")]
    NotFound,

    #[error("run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} {args}: {detail}")]
    Failed {
        program: String,
        args: String,
        detail: String,
    },

    /// Free-form failure, mostly for substitute implementations.
    #[error("{0}")]
    Other(String),
}

/// Locates the BOSH CLI and runs it with captured stdout.
#[async_trait]
pub trait BoshCommand: Send + Sync {
    /// Path of the bosh binary scripts should invoke.
    fn bosh_path(&self) -> Result<String, CommandError>;

    /// Run bosh with `args`, returning stdout. A non-zero exit is an error.
    async fn run(
        &self,
        working_dir: Option<&Path>,
        args: &[String],
    ) -> Result<String, CommandError>;
}

/// Runs the real `bosh` binary.
#[derive(Debug, Clone, Default)]
pub struct BoshCli {
    path: Option<PathBuf>,
}

impl BoshCli {
    /// Resolve the binary from PATH on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit binary.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn lookup() -> Option<PathBuf> {
        let path_var = env::var_os("PATH")?;
        BOSH_BINARIES.iter().find_map(|name| {
            env::split_paths(&path_var)
                .map(|dir| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }
}

#[async_trait]
impl BoshCommand for BoshCli {
    fn bosh_path(&self) -> Result<String, CommandError> {
        self.path
            .clone()
            .or_else(Self::lookup)
            .map(|p| p.display().to_string())
            .ok_or(CommandError::NotFound)
    }

    async fn run(
        &self,
        working_dir: Option<&Path>,
        args: &[String],
    ) -> Result<String, CommandError> {
        let program = self.bosh_path()?;
        tracing::debug!(%program, ?args, "running bosh");

        let mut cmd = Command::new(&program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| CommandError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut detail = exit_detail(&output.status);
            if !stderr.trim().is_empty() {
                detail = format!("{detail}: {}", stderr.trim());
            }
            return Err(CommandError::Failed {
                program,
                args: args.join(" "),
                detail,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// `exit status N`, or the terminating signal when there is no code.
pub(crate) fn exit_detail(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => signal_detail(status),
    }
}

#[cfg(unix)]
fn signal_detail(status: &ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => format!("signal: {signal}"),
        None => "terminated".to_string(),
    }
}

#[cfg(not(unix))]
fn signal_detail(_status: &ExitStatus) -> String {
    "terminated".to_string()
}
