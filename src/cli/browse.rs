use std::path::Path;

use crate::browser::{choices_from_rules, DatasetBrowser};
use crate::dataset;
use crate::error::Result;
use crate::rules::RuleSet;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let rows = dataset::load(&config.output_final, &config)?;
    let rules = RuleSet::load(&config.rules_file)?;

    let mut browser = DatasetBrowser::new(rows, choices_from_rules(&rules));
    browser.run(&config)
}
