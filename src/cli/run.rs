use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::pipeline::{self, RunOutcome};

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;

    match pipeline::run(&config)? {
        RunOutcome::NoNewOperations => {
            println!("No new operations.");
        }
        RunOutcome::Persisted {
            added,
            total,
            categorized,
            uncategorized,
        } => {
            println!(
                "{} new operation(s) added, {total} total in {}",
                added.to_string().green(),
                config.output_final.display()
            );
            println!("{categorized} categorized, {uncategorized} left as 'other'");
        }
    }
    Ok(())
}
