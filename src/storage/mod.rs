// ABOUTME: Environment state model and its on-disk store.
// ABOUTME: State is written through after every mutating stage.

mod state;
mod store;

pub use state::{BoshState, JumpboxState, STATE_VERSION, State};
pub use store::{STATE_FILENAME, StateStore, StoreError};
