mod browser;
mod categorizer;
mod cleaner;
mod cli;
mod config;
mod dataset;
mod error;
mod fmt;
mod loader;
mod merger;
mod models;
mod pipeline;
mod rules;
mod tui;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Run => cli::run::run(config),
        Commands::Init { force } => cli::init::run(config, force),
        Commands::Rules => cli::rules::run(config),
        Commands::Status => cli::status::run(config),
        Commands::Browse => cli::browse::run(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
