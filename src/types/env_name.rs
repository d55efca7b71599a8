// ABOUTME: Validated environment name used as the BOSH director name suffix.
// ABOUTME: Names are DNS-label style: lowercase, start with a letter, hyphens inside.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvNameError {
    #[error("environment name cannot be empty")]
    Empty,

    #[error("environment name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("environment name must start with a letter")]
    StartsWithNonLetter,

    #[error("environment name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("invalid character in environment name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvName(String);

impl EnvName {
    pub fn new(value: &str) -> Result<Self, EnvNameError> {
        let Some(first) = value.chars().next() else {
            return Err(EnvNameError::Empty);
        };

        if value.len() > 63 {
            return Err(EnvNameError::TooLong);
        }

        if !first.is_ascii_lowercase() {
            return Err(EnvNameError::StartsWithNonLetter);
        }

        if value.ends_with('-') {
            return Err(EnvNameError::EndsWithHyphen);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(EnvNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
