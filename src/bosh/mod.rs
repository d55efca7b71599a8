// ABOUTME: BOSH create-env orchestration for the jumpbox and director.
// ABOUTME: Artifact checks, overlay interpolation, script generation and execution.

pub mod artifacts;
mod command;
mod error;
mod executor;
pub mod interpolate;
mod manager;
pub mod script;
pub mod templates;

pub use artifacts::{Role, is_initialized, required_artifacts};
pub use command::{BoshCli, BoshCommand, CommandError};
pub use error::ExecutorError;
pub use executor::{CreateEnvInput, DeleteEnvInput, Executor};
pub use interpolate::{InterpolateInput, STATE_DIR_VAR, USER_OPS_FILE};
pub use manager::{BoshManager, ManagerError, deployment_vars};
pub use script::{Action, generate};
