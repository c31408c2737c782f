use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReleveError, Result};
use crate::loader::Encoding;
use crate::models::COL_ACCOUNT;

/// Default configuration locations, tried in order. A `.local` file holds
/// personal paths and wins over the checked-in example.
pub const CONFIG_CANDIDATES: &[&str] = &["config/config.local.yml", "config/config.yml"];

/// Run parameters, loaded once at startup and passed by reference into every
/// component. No global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Folder scanned (non-recursively) for statement exports.
    pub input_folder: PathBuf,
    /// Case-insensitive file name suffixes, e.g. ".csv".
    pub file_extensions: Vec<String>,
    /// The accumulated dataset file, rewritten wholesale on each run.
    pub output_final: PathBuf,
    /// Canonical names assigned positionally to the surviving raw columns
    /// (the appended Account column included, conventionally last).
    pub rename_columns: Vec<String>,
    pub date_column: String,
    pub amount_column: String,
    pub description_column: String,
    /// Key columns for deduplication against the existing dataset.
    pub merge_columns: Vec<String>,
    pub currency: String,
    #[serde(default = "default_separator")]
    pub separator: char,
    /// Preamble lines to skip before the header row of each export.
    #[serde(default)]
    pub skiprows: usize,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    pub rules_file: PathBuf,
}

fn default_separator() -> char {
    ';'
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReleveError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ReleveError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration path: an explicit `--config` wins, then the
    /// default candidates in order.
    pub fn resolve(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        for candidate in CONFIG_CANDIDATES {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(path);
            }
        }
        Err(ReleveError::Config(
            "no configuration file found; run `releve init` or pass --config".to_string(),
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.file_extensions.is_empty() {
            return Err(ReleveError::Config("file_extensions is empty".to_string()));
        }
        if self.rename_columns.is_empty() {
            return Err(ReleveError::Config("rename_columns is empty".to_string()));
        }
        if self.merge_columns.is_empty() {
            return Err(ReleveError::Config("merge_columns is empty".to_string()));
        }
        if !self.separator.is_ascii() {
            return Err(ReleveError::Config(format!(
                "separator '{}' is not a single ASCII character",
                self.separator
            )));
        }
        Encoding::parse(&self.encoding).ok_or_else(|| {
            ReleveError::Config(format!("unsupported encoding '{}'", self.encoding))
        })?;
        for required in [
            &self.date_column,
            &self.amount_column,
            &self.description_column,
        ] {
            if !self.rename_columns.contains(required) {
                return Err(ReleveError::Config(format!(
                    "rename_columns does not contain '{required}'"
                )));
            }
        }
        if !self.rename_columns.iter().any(|c| c == COL_ACCOUNT) {
            return Err(ReleveError::Config(format!(
                "rename_columns must name the appended '{COL_ACCOUNT}' column"
            )));
        }
        Ok(())
    }

    /// The configuration written by `releve init`; also the fixture most
    /// tests start from.
    pub fn example() -> Config {
        Config {
            input_folder: PathBuf::from("data/raw"),
            file_extensions: vec![".csv".to_string()],
            output_final: PathBuf::from("data/processed/final_data.csv"),
            rename_columns: vec![
                "Date".to_string(),
                "Details".to_string(),
                "Amount".to_string(),
                "Account".to_string(),
            ],
            date_column: "Date".to_string(),
            amount_column: "Amount".to_string(),
            description_column: "Details".to_string(),
            merge_columns: vec![
                "Date".to_string(),
                "Details".to_string(),
                "Amount".to_string(),
                "Account".to_string(),
            ],
            currency: "EUR".to_string(),
            separator: ';',
            skiprows: 0,
            encoding: "utf-8".to_string(),
            rules_file: PathBuf::from("config/categories.json"),
        }
    }
}
