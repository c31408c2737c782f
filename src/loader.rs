use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{ReleveError, Result};
use crate::models::{RawTable, COL_ACCOUNT};

/// Statement exports come in the bank's encoding, not ours. UTF-8 and
/// Latin-1 cover the formats actually seen; anything else is rejected at
/// configuration load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    pub fn parse(name: &str) -> Option<Encoding> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Some(Encoding::Latin1),
            _ => None,
        }
    }

    fn decode(&self, bytes: &[u8], path: &Path) -> Result<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| {
                ReleveError::Other(format!("{} is not valid UTF-8", path.display()))
            }),
            // Latin-1 maps each byte to the code point of the same value.
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Files in `folder` whose names end with one of `extensions`,
/// case-insensitively. Not recursive. Sorted by file name so the
/// concatenation order is stable across platforms.
pub fn statement_files(folder: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_lowercase()))
        {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// The bank's export naming scheme puts the account identifier in the first
/// 11 characters of the file name.
pub fn account_from_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().chars().take(11).collect())
        .unwrap_or_default()
}

/// Parse one export: decode, skip the preamble, read the delimited table
/// (first remaining row is the raw header), and append the Account column.
/// Parse failures propagate; nothing is caught here.
pub fn load_statement(path: &Path, config: &Config) -> Result<RawTable> {
    let encoding = Encoding::parse(&config.encoding).ok_or_else(|| {
        ReleveError::Config(format!("unsupported encoding '{}'", config.encoding))
    })?;
    let bytes = std::fs::read(path)?;
    let text = encoding.decode(&bytes, path)?;

    let mut remainder = text.as_str();
    for _ in 0..config.skiprows {
        match remainder.find('\n') {
            Some(i) => remainder = &remainder[i + 1..],
            None => remainder = "",
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.separator as u8)
        .has_headers(false)
        .from_reader(remainder.as_bytes());

    let account = account_from_filename(path);
    let mut table = RawTable::default();
    for record in reader.records() {
        let record = record?;
        let fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        if table.columns.is_empty() {
            table.columns = fields;
            table.columns.push(COL_ACCOUNT.to_string());
        } else {
            let mut row = fields;
            row.push(account.clone());
            table.rows.push(row);
        }
    }
    if table.columns.is_empty() {
        return Err(ReleveError::Other(format!(
            "{}: no header row after skipping {} line(s)",
            path.display(),
            config.skiprows
        )));
    }
    Ok(table)
}

/// Load and concatenate every statement file in the input folder, preserving
/// row order within each file and file-name order across files. All files
/// must share one header. An empty folder yields an empty table.
pub fn load_folder(config: &Config) -> Result<RawTable> {
    let files = statement_files(&config.input_folder, &config.file_extensions)?;
    let mut merged = RawTable::default();
    for path in &files {
        let table = load_statement(path, config)?;
        if merged.columns.is_empty() {
            merged.columns = table.columns;
        } else if merged.columns != table.columns {
            return Err(ReleveError::Other(format!(
                "{}: columns differ from the preceding statement files",
                path.display()
            )));
        }
        merged.rows.extend(table.rows);
    }
    Ok(merged)
}
