// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: IaaS backend tags and environment names.

mod env_name;
mod iaas;

pub use env_name::{EnvName, EnvNameError};
pub use iaas::{Iaas, UnsupportedIaas};
