// ABOUTME: Command implementations behind the CLI subcommands.
// ABOUTME: `plan`/`up` share the stage orchestrator; `destroy` runs the delete scripts.

pub mod destroy;
pub mod plan;
pub mod up;

pub use destroy::{BoshDeleter, Destroy, DestroyError};
pub use plan::{
    BoshInitializer, CloudConfigInit, EnvIdSync, InfrastructureInit, Plan, PlanError,
    PlanErrorKind, StateSaver, UpCommand,
};
pub use up::{BoshVersion, MINIMUM_BOSH_VERSION, Up, UpConfig, UpError};
