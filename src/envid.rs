// ABOUTME: Assigns the environment id (and internal id) recorded in State.
// ABOUTME: Existing ids are kept, so re-running with the same name is a no-op.

use crate::storage::State;
use crate::types::{EnvName, EnvNameError};
use chrono::Utc;
use thiserror::Error;

const NAME_WORDS: [&str; 8] = [
    "erie", "huron", "superior", "ontario", "michigan", "tahoe", "baikal", "titicaca",
];

#[derive(Debug, Error)]
pub enum EnvIdError {
    #[error("invalid environment name \"{name}\": {source}")]
    InvalidName { name: String, source: EnvNameError },

    #[error("environment is already named \"{current}\", cannot rename to \"{requested}\"")]
    NameChange { current: String, requested: String },
}

#[derive(Debug, Clone, Default)]
pub struct EnvIdManager;

impl EnvIdManager {
    pub fn new() -> Self {
        Self
    }

    /// Ensure `state` carries an environment id, using `name` when given.
    pub fn sync(&self, mut state: State, name: &str) -> Result<State, EnvIdError> {
        if !state.env_id.is_empty() {
            if !name.is_empty() && name != state.env_id {
                return Err(EnvIdError::NameChange {
                    current: state.env_id,
                    requested: name.to_string(),
                });
            }
        } else if name.is_empty() {
            state.env_id = generate_name();
            tracing::info!(env_id = %state.env_id, "generated environment name");
        } else {
            state.env_id = EnvName::new(name)
                .map_err(|source| EnvIdError::InvalidName {
                    name: name.to_string(),
                    source,
                })?
                .into_inner();
        }

        if state.id.is_empty() {
            state.id = generate_id();
        }

        Ok(state)
    }
}

fn generate_name() -> String {
    let now = Utc::now();
    let word = NAME_WORDS[now.timestamp_subsec_nanos() as usize % NAME_WORDS.len()];
    format!("bbl-env-{word}-{}", now.format("%Y-%m-%dt%H-%M-%Sz"))
}

fn generate_id() -> String {
    let now = Utc::now();
    format!(
        "{:x}-{:x}",
        now.timestamp_nanos_opt().unwrap_or_default(),
        std::process::id()
    )
}
