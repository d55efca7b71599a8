// ABOUTME: Application-wide error type for the bbl binary.
// ABOUTME: Wraps each module's error so main can print one message and exit.

use crate::commands::{DestroyError, PlanError};
use crate::config::ConfigError;
use crate::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Destroy(#[from] DestroyError),
}

pub type Result<T> = std::result::Result<T, Error>;
