use std::collections::HashSet;

use crate::config::Config;
use crate::error::Result;
use crate::models::Transaction;

/// Left-anti-join: keep the cleaned rows whose key-column values do not
/// already appear in the existing dataset. Only the configured key columns
/// are compared, not the full row. With an empty existing dataset every row
/// passes through.
///
/// Whether the key set actually identifies a transaction uniquely is the
/// configuration's problem; two distinct real-world operations with equal
/// keys will be collapsed.
pub fn new_rows(
    cleaned: Vec<Transaction>,
    existing: &[Transaction],
    config: &Config,
) -> Result<Vec<Transaction>> {
    if existing.is_empty() {
        return Ok(cleaned);
    }
    let mut known: HashSet<String> = HashSet::with_capacity(existing.len());
    for txn in existing {
        known.insert(txn.merge_key(&config.merge_columns, config)?);
    }
    let mut fresh = Vec::new();
    for txn in cleaned {
        if !known.contains(&txn.merge_key(&config.merge_columns, config)?) {
            fresh.push(txn);
        }
    }
    Ok(fresh)
}
