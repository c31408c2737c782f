pub mod browse;
pub mod init;
pub mod rules;
pub mod run;
pub mod status;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = Config::resolve(explicit)?;
    Config::load(&path)
}

#[derive(Parser)]
#[command(
    name = "releve",
    about = "Bank-statement ETL: ingest, clean, deduplicate and categorize CSV exports."
)]
pub struct Cli {
    /// Configuration file (default: config/config.local.yml, then config/config.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline: load, clean, deduplicate, categorize, persist.
    Run,
    /// Scaffold an example configuration, rules file and data folders.
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// List the categorization rules in evaluation order.
    Rules,
    /// Show dataset location and summary counts.
    Status,
    /// Interactively browse the dataset and re-categorize operations.
    Browse,
}
