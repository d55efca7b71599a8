// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Global flags apply to every subcommand; plan/up pass their own flags through untouched.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bbl")]
#[command(about = "Stand up a BOSH director and jumpbox on AWS, GCP or Azure")]
#[command(version)]
pub struct Cli {
    /// Directory holding bbl-state.json and generated files [env: BBL_STATE_DIR]
    #[arg(short, long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// IaaS to deploy to: gcp, aws or azure [env: BBL_IAAS]
    #[arg(long, global = true)]
    pub iaas: Option<String>,

    /// Print debug logs [env: BBL_DEBUG]
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate state, scripts and templates, then create the jumpbox and director
    Plan {
        /// --name NAME, --no-director, --ops-file PATH
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Same pipeline as plan
    Up {
        /// --name NAME, --no-director, --ops-file PATH
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Delete the director and jumpbox using the generated delete scripts
    Destroy,

    /// Print bbl and BOSH CLI versions
    Version,
}
