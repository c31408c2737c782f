use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{ReleveError, Result};

// Order matters: the generic UBER pattern sits before the UBER EATS one so
// the more specific rule wins on overlap.
const EXAMPLE_RULES: &str = r#"{
  "groceries": {
    "main_category": "food",
    "patterns": ["CARREFOUR", "MONOPRIX", "AUCHAN", "LIDL"]
  },
  "transport": {
    "main_category": "travel",
    "patterns": ["SNCF", "RATP", "UBER"]
  },
  "restaurants": {
    "main_category": "food",
    "patterns": ["UBER EATS", "DELIVEROO", "RESTAURANT"]
  },
  "salary": {
    "main_category": "income",
    "patterns": ["VIREMENT SALAIRE"]
  }
}
"#;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("config/config.yml"));
    if path.exists() && !force {
        return Err(ReleveError::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let config = Config::example();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| ReleveError::Other(format!("cannot serialize configuration: {e}")))?;
    std::fs::write(&path, yaml)?;
    println!("Wrote {}", path.display());

    if !config.rules_file.exists() {
        if let Some(parent) = config.rules_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config.rules_file, EXAMPLE_RULES)?;
        println!("Wrote {}", config.rules_file.display());
    }

    std::fs::create_dir_all(&config.input_folder)?;
    if let Some(parent) = config.output_final.parent() {
        std::fs::create_dir_all(parent)?;
    }

    println!();
    println!("Next steps:");
    println!(
        "  1. Drop your bank exports into {}",
        config.input_folder.display()
    );
    println!("  2. Adjust the column names and separator in {}", path.display());
    println!("  3. releve run");
    Ok(())
}
