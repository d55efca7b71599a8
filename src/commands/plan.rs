// ABOUTME: Stage orchestrator for `plan` / `up`: one State flows through every stage in order.
// ABOUTME: Collaborators are injected through single-purpose traits; the first failure aborts the run.

use super::up::{BoshVersion, Up, UpConfig, UpError};
use crate::bosh::{BoshCommand, BoshManager, ManagerError};
use crate::cloudconfig::{CloudConfigError, CloudConfigManager};
use crate::envid::{EnvIdError, EnvIdManager};
use crate::storage::{State, StateStore, StoreError};
use crate::terraform::{TerraformError, TerraformManager};
use async_trait::async_trait;
use snafu::{ResultExt, Snafu};

/// Argument parsing and fast-fail validation.
#[async_trait]
pub trait UpCommand: Send + Sync {
    fn parse_args(&self, args: &[String], state: &State) -> Result<UpConfig, UpError>;
    async fn check_fast_fails(&self, config: &UpConfig, state: &State) -> Result<(), UpError>;
}

/// Assigns the environment id.
pub trait EnvIdSync: Send + Sync {
    fn sync(&self, state: State, name: &str) -> Result<State, EnvIdError>;
}

/// Durable write-through of the state document.
pub trait StateSaver: Send + Sync {
    fn save(&self, state: &State) -> Result<(), StoreError>;
}

/// Prepares the infrastructure-provisioning working directory.
#[async_trait]
pub trait InfrastructureInit: Send + Sync {
    async fn init(&self, state: &State) -> Result<(), TerraformError>;
}

/// Stands up the jumpbox and the director.
#[async_trait]
pub trait BoshInitializer: Send + Sync {
    async fn initialize_jumpbox(&self, state: State) -> Result<State, ManagerError>;
    async fn initialize_director(&self, state: State) -> Result<State, ManagerError>;
}

/// Writes the cloud-config for the new director.
pub trait CloudConfigInit: Send + Sync {
    fn initialize(&self, state: &State) -> Result<(), CloudConfigError>;
}

#[async_trait]
impl<V: BoshVersion> UpCommand for Up<V> {
    fn parse_args(&self, args: &[String], state: &State) -> Result<UpConfig, UpError> {
        Up::parse_args(self, args, state)
    }

    async fn check_fast_fails(&self, config: &UpConfig, state: &State) -> Result<(), UpError> {
        Up::check_fast_fails(self, config, state).await
    }
}

impl EnvIdSync for EnvIdManager {
    fn sync(&self, state: State, name: &str) -> Result<State, EnvIdError> {
        EnvIdManager::sync(self, state, name)
    }
}

impl StateSaver for StateStore {
    fn save(&self, state: &State) -> Result<(), StoreError> {
        self.set(state)
    }
}

#[async_trait]
impl InfrastructureInit for TerraformManager {
    async fn init(&self, state: &State) -> Result<(), TerraformError> {
        TerraformManager::init(self, state).await
    }
}

#[async_trait]
impl<C: BoshCommand> BoshInitializer for BoshManager<C> {
    async fn initialize_jumpbox(&self, state: State) -> Result<State, ManagerError> {
        BoshManager::initialize_jumpbox(self, state).await
    }

    async fn initialize_director(&self, state: State) -> Result<State, ManagerError> {
        BoshManager::initialize_director(self, state).await
    }
}

impl CloudConfigInit for CloudConfigManager {
    fn initialize(&self, state: &State) -> Result<(), CloudConfigError> {
        CloudConfigManager::initialize(self, state)
    }
}

/// A failed stage, labelled with the collaborator that failed.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PlanError {
    #[snafu(display("{source}"))]
    ParseArgs { source: UpError },

    #[snafu(display("{source}"))]
    FastFail { source: UpError },

    #[snafu(display(
        "Director already exists, you must re-create your environment to use \"--no-director\""
    ))]
    DirectorExists {},

    #[snafu(display("Env id manager sync: {source}"))]
    EnvIdSync { source: EnvIdError },

    #[snafu(display("Save state: {source}"))]
    SaveState { source: StoreError },

    #[snafu(display("Terraform manager init: {source}"))]
    TerraformInit { source: TerraformError },

    #[snafu(display("Bosh manager initialize jumpbox: {source}"))]
    InitializeJumpbox { source: ManagerError },

    #[snafu(display("Bosh manager initialize director: {source}"))]
    InitializeDirector { source: ManagerError },

    #[snafu(display("Cloud config manager initialize: {source}"))]
    CloudConfig { source: CloudConfigError },
}

/// Which stage failed, for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanErrorKind {
    /// Arguments did not parse, or the ops-file could not be read.
    InvalidArgs,
    /// A fast-fail check rejected the run.
    FastFail,
    /// `--no-director` requested for an environment that has a director.
    DirectorExists,
    EnvId,
    SaveState,
    Infrastructure,
    Jumpbox,
    Director,
    CloudConfig,
}

impl PlanError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> PlanErrorKind {
        match self {
            PlanError::ParseArgs { .. } => PlanErrorKind::InvalidArgs,
            PlanError::FastFail { .. } => PlanErrorKind::FastFail,
            PlanError::DirectorExists { .. } => PlanErrorKind::DirectorExists,
            PlanError::EnvIdSync { .. } => PlanErrorKind::EnvId,
            PlanError::SaveState { .. } => PlanErrorKind::SaveState,
            PlanError::TerraformInit { .. } => PlanErrorKind::Infrastructure,
            PlanError::InitializeJumpbox { .. } => PlanErrorKind::Jumpbox,
            PlanError::InitializeDirector { .. } => PlanErrorKind::Director,
            PlanError::CloudConfig { .. } => PlanErrorKind::CloudConfig,
        }
    }
}

/// The stand-up pipeline.
///
/// State is persisted after every mutating stage, so an interrupted run
/// resumes from the last completed stage when invoked again.
#[derive(Debug, Clone)]
pub struct Plan<U, E, S, T, B, C> {
    up: U,
    env_id: E,
    store: S,
    terraform: T,
    bosh: B,
    cloud_config: C,
}

impl<U, E, S, T, B, C> Plan<U, E, S, T, B, C>
where
    U: UpCommand,
    E: EnvIdSync,
    S: StateSaver,
    T: InfrastructureInit,
    B: BoshInitializer,
    C: CloudConfigInit,
{
    pub fn new(up: U, env_id: E, store: S, terraform: T, bosh: B, cloud_config: C) -> Self {
        Self {
            up,
            env_id,
            store,
            terraform,
            bosh,
            cloud_config,
        }
    }

    pub fn parse_args(&self, args: &[String], state: &State) -> Result<UpConfig, PlanError> {
        self.up.parse_args(args, state).context(ParseArgsSnafu)
    }

    pub async fn check_fast_fails(&self, args: &[String], state: &State) -> Result<(), PlanError> {
        let config = self.parse_args(args, state)?;
        self.up
            .check_fast_fails(&config, state)
            .await
            .context(FastFailSnafu)
    }

    /// Run every stage against `state`, returning the final state.
    pub async fn execute(&self, args: &[String], mut state: State) -> Result<State, PlanError> {
        let config = self.parse_args(args, &state)?;
        self.up
            .check_fast_fails(&config, &state)
            .await
            .context(FastFailSnafu)?;

        if config.no_director {
            if state.has_director() {
                return DirectorExistsSnafu.fail();
            }
            state.no_director = true;
        }

        if let Some(ops) = config.read_ops_file().context(ParseArgsSnafu)? {
            state.bosh.user_ops_file = ops;
        }

        let mut state = self
            .env_id
            .sync(state, &config.name)
            .context(EnvIdSyncSnafu)?;
        self.save(&state)?;
        tracing::info!(env_id = %state.env_id, no_director = state.no_director, "state saved");

        self.terraform
            .init(&state)
            .await
            .context(TerraformInitSnafu)?;

        if state.no_director {
            tracing::info!("no director requested, stopping after infrastructure init");
            return Ok(state);
        }

        state = self
            .bosh
            .initialize_jumpbox(state)
            .await
            .context(InitializeJumpboxSnafu)?;
        self.save(&state)?;

        state = self
            .bosh
            .initialize_director(state)
            .await
            .context(InitializeDirectorSnafu)?;
        self.save(&state)?;

        self.cloud_config
            .initialize(&state)
            .context(CloudConfigSnafu)?;

        tracing::info!(env_id = %state.env_id, "plan complete");
        Ok(state)
    }

    fn save(&self, state: &State) -> Result<(), PlanError> {
        self.store.save(state).context(SaveStateSnafu)
    }
}
