// ABOUTME: Persisted environment state written to bbl-state.json.
// ABOUTME: Tracks IaaS, environment id, no-director mode and the jumpbox/director sub-states.

use crate::types::Iaas;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Schema version written with every state file.
pub const STATE_VERSION: u32 = 14;

/// Root record of an environment's provisioning progress.
///
/// A director-backed environment and `no_director` are mutually exclusive:
/// once `no_director` is set, `bosh` must stay empty. This is checked by the
/// commands that flip the flag, not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct State {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iaas: Option<Iaas>,
    pub id: String,
    #[serde(rename = "envID")]
    pub env_id: String,
    pub no_director: bool,
    pub jumpbox: JumpboxState,
    pub bosh: BoshState,
    #[serde(rename = "tfState")]
    pub tf_state: String,
    #[serde(rename = "latestTFOutput")]
    pub latest_tf_output: BTreeMap<String, Value>,
}

impl State {
    /// A fresh state for a first run.
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            ..Self::default()
        }
    }

    /// Whether a director is (or was) part of this environment.
    pub fn has_director(&self) -> bool {
        !self.bosh.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JumpboxState {
    pub url: String,
    pub variables: String,
    pub manifest: String,
    pub state: Map<String, Value>,
}

impl JumpboxState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoshState {
    pub director_name: String,
    pub director_username: String,
    pub director_password: String,
    pub director_address: String,
    #[serde(rename = "directorSSLCA")]
    pub director_ssl_ca: String,
    pub variables: String,
    pub state: Map<String, Value>,
    pub manifest: String,
    pub user_ops_file: String,
}

impl BoshState {
    /// True for a state that has never seen a director.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
