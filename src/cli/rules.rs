use std::path::Path;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::rules::RuleSet;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let rules = RuleSet::load(&config.rules_file)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Subcategory", "Category", "Patterns"]);
    for (i, rule) in rules.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.subcategory),
            Cell::new(&rule.main_category),
            Cell::new(rule.patterns.join(", ")),
        ]);
    }
    println!(
        "{} rule(s), in evaluation order (later matches win)\n{table}",
        rules.len()
    );
    Ok(())
}
