// ABOUTME: Teardown: runs the generated delete scripts for the director, then the jumpbox.
// ABOUTME: State is saved after each step so a failed destroy can be re-run.

use super::plan::StateSaver;
use crate::bosh::{BoshCommand, BoshManager, ManagerError};
use crate::storage::{State, StoreError};
use async_trait::async_trait;
use snafu::{ResultExt, Snafu};

/// Tears down the director and jumpbox.
#[async_trait]
pub trait BoshDeleter: Send + Sync {
    async fn delete_director(&self, state: State) -> Result<State, ManagerError>;
    async fn delete_jumpbox(&self, state: State) -> Result<State, ManagerError>;
}

#[async_trait]
impl<C: BoshCommand> BoshDeleter for BoshManager<C> {
    async fn delete_director(&self, state: State) -> Result<State, ManagerError> {
        BoshManager::delete_director(self, state).await
    }

    async fn delete_jumpbox(&self, state: State) -> Result<State, ManagerError> {
        BoshManager::delete_jumpbox(self, state).await
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DestroyError {
    #[snafu(display("Delete director: {source}"))]
    DeleteDirector { source: ManagerError },

    #[snafu(display("Delete jumpbox: {source}"))]
    DeleteJumpbox { source: ManagerError },

    #[snafu(display("Save state: {source}"))]
    SaveState { source: StoreError },
}

#[derive(Debug, Clone)]
pub struct Destroy<B, S> {
    bosh: B,
    store: S,
}

impl<B: BoshDeleter, S: StateSaver> Destroy<B, S> {
    pub fn new(bosh: B, store: S) -> Self {
        Self { bosh, store }
    }

    pub async fn execute(&self, mut state: State) -> Result<State, DestroyError> {
        if state.iaas.is_none() {
            tracing::info!("environment was never planned, nothing to destroy");
            return Ok(state);
        }

        if state.no_director {
            tracing::info!("no director in this environment");
        } else {
            state = self
                .bosh
                .delete_director(state)
                .await
                .context(DeleteDirectorSnafu)?;
            self.store.save(&state).context(SaveStateSnafu)?;
        }

        state = self
            .bosh
            .delete_jumpbox(state)
            .await
            .context(DeleteJumpboxSnafu)?;
        self.store.save(&state).context(SaveStateSnafu)?;

        tracing::info!(env_id = %state.env_id, "destroy complete");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Iaas;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn planned() -> State {
        let mut state = State::new();
        state.iaas = Some(Iaas::Aws);
        state
    }

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_director: bool,
    }

    #[async_trait]
    impl BoshDeleter for Recorder {
        async fn delete_director(&self, mut state: State) -> Result<State, ManagerError> {
            self.calls.lock().push("delete_director");
            if self.fail_director {
                return Err(ManagerError::MissingIaas);
            }
            state.bosh = Default::default();
            Ok(state)
        }

        async fn delete_jumpbox(&self, mut state: State) -> Result<State, ManagerError> {
            self.calls.lock().push("delete_jumpbox");
            state.jumpbox = Default::default();
            Ok(state)
        }
    }

    impl StateSaver for Recorder {
        fn save(&self, _state: &State) -> Result<(), StoreError> {
            self.calls.lock().push("save");
            Ok(())
        }
    }

    #[tokio::test]
    async fn deletes_director_then_jumpbox() {
        let recorder = Recorder::default();
        let destroy = Destroy::new(recorder.clone(), recorder.clone());

        destroy.execute(planned()).await.unwrap();

        assert_eq!(
            *recorder.calls.lock(),
            ["delete_director", "save", "delete_jumpbox", "save"]
        );
    }

    #[tokio::test]
    async fn unplanned_environment_is_left_alone() {
        let recorder = Recorder::default();
        let destroy = Destroy::new(recorder.clone(), recorder.clone());

        let state = destroy.execute(State::new()).await.unwrap();

        assert_eq!(state, State::new());
        assert!(recorder.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn no_director_only_deletes_jumpbox() {
        let recorder = Recorder::default();
        let destroy = Destroy::new(recorder.clone(), recorder.clone());
        let mut state = planned();
        state.no_director = true;

        destroy.execute(state).await.unwrap();

        assert_eq!(*recorder.calls.lock(), ["delete_jumpbox", "save"]);
    }

    #[tokio::test]
    async fn director_failure_stops_before_jumpbox() {
        let recorder = Recorder {
            fail_director: true,
            ..Recorder::default()
        };
        let destroy = Destroy::new(recorder.clone(), recorder.clone());

        let err = destroy.execute(planned()).await.unwrap_err();

        assert!(err.to_string().starts_with("Delete director: "));
        assert_eq!(*recorder.calls.lock(), ["delete_director"]);
    }
}
