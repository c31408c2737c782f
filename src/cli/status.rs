use std::path::Path;

use crate::dataset;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::loader;
use crate::models::{format_date, DEFAULT_CATEGORY};

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = crate::config::Config::resolve(config_path)?;
    let config = crate::config::Config::load(&path)?;

    println!("Config:     {}", path.display());
    let pending = loader::statement_files(&config.input_folder, &config.file_extensions)
        .map(|f| f.len())
        .unwrap_or(0);
    println!(
        "Input:      {} ({pending} statement file(s))",
        config.input_folder.display()
    );
    println!("Dataset:    {}", config.output_final.display());

    if !config.output_final.exists() {
        println!();
        println!("Dataset not found. Run `releve run` to create it.");
        return Ok(());
    }

    let size = std::fs::metadata(&config.output_final)?.len();
    println!("Size:       {}", format_bytes(size));

    let rows = dataset::load(&config.output_final, &config)?;
    let accounts: std::collections::HashSet<&str> =
        rows.iter().map(|t| t.account.as_str()).collect();
    let categorized = rows
        .iter()
        .filter(|t| t.subcategory != DEFAULT_CATEGORY)
        .count();
    let manual = rows.iter().filter(|t| t.is_manual).count();
    let first = rows.iter().filter_map(|t| t.date).min();
    let last = rows.iter().filter_map(|t| t.date).max();

    println!();
    println!("Operations:  {}", rows.len());
    println!("Accounts:    {}", accounts.len());
    println!("Categorized: {categorized} ({manual} manual)");
    if first.is_some() {
        println!(
            "Date range:  {} to {}",
            format_date(first),
            format_date(last)
        );
    }
    Ok(())
}
