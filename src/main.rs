// ABOUTME: Entry point for the bbl CLI application.
// ABOUTME: Resolves configuration, wires the managers together and dispatches subcommands.

mod cli;

use bbl::bosh::{BoshCli, BoshManager, Executor};
use bbl::cloudconfig::CloudConfigManager;
use bbl::commands::{Destroy, Plan, Up};
use bbl::config::{ConfigFlags, GlobalConfig};
use bbl::envid::EnvIdManager;
use bbl::error::Result;
use bbl::storage::StateStore;
use bbl::terraform::TerraformManager;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match GlobalConfig::resolve(ConfigFlags {
        state_dir: cli.state_dir.clone(),
        iaas: cli.iaas.clone(),
        debug: cli.debug,
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let filter = if config.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command, config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: GlobalConfig) -> Result<()> {
    let store = StateStore::new(&config.state_dir);
    let executor = Executor::new(BoshCli::new());

    match command {
        Commands::Plan { args } | Commands::Up { args } => {
            let mut state = store.get()?;
            config.apply_iaas(&mut state)?;

            let plan = Plan::new(
                Up::new(executor.clone()),
                EnvIdManager::new(),
                store.clone(),
                TerraformManager::new(store.clone()),
                BoshManager::new(executor, store.clone()),
                CloudConfigManager::new(store.clone()),
            );
            let state = plan.execute(&args, state).await?;

            println!("Environment {} is ready", state.env_id);
            if !state.bosh.director_address.is_empty() {
                println!("Director: {}", state.bosh.director_address);
            }
            Ok(())
        }
        Commands::Destroy => {
            let state = store.get()?;
            let destroy = Destroy::new(BoshManager::new(executor, store.clone()), store);
            let state = destroy.execute(state).await?;
            println!("Environment {} destroyed", state.env_id);
            Ok(())
        }
        Commands::Version => {
            println!("bbl {}", env!("CARGO_PKG_VERSION"));
            match executor.version().await {
                Ok(version) => println!("bosh {version}"),
                Err(e) => println!("bosh unknown ({e})"),
            }
            Ok(())
        }
    }
}
