// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup, executable fixtures and a scripted BoshCommand.

use async_trait::async_trait;
use bbl::bosh::{BoshCommand, CommandError};
use parking_lot::Mutex;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("bbl=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Write `contents` to `path` and mark it executable.
#[allow(dead_code)]
pub fn write_script(path: &Path, contents: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

/// A bosh that answers every `run` with fixed output and records its calls.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct FakeBosh {
    pub path: String,
    pub stdout: Result<String, String>,
    pub calls: Arc<Mutex<Vec<(Option<PathBuf>, Vec<String>)>>>,
}

#[allow(dead_code)]
impl FakeBosh {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            stdout: Ok(String::new()),
            calls: Arc::default(),
        }
    }

    /// Working dir and arguments of every `run`, in order.
    pub fn calls(&self) -> Vec<(Option<PathBuf>, Vec<String>)> {
        self.calls.lock().clone()
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = Ok(stdout.to_string());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.stdout = Err(message.to_string());
        self
    }
}

#[async_trait]
impl BoshCommand for FakeBosh {
    fn bosh_path(&self) -> Result<String, CommandError> {
        Ok(self.path.clone())
    }

    async fn run(
        &self,
        working_dir: Option<&Path>,
        args: &[String],
    ) -> Result<String, CommandError> {
        self.calls
            .lock()
            .push((working_dir.map(Path::to_path_buf), args.to_vec()));
        self.stdout.clone().map_err(CommandError::Other)
    }
}
