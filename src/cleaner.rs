use std::collections::HashSet;

use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{ReleveError, Result};
use crate::models::{RawTable, Transaction, COL_ACCOUNT};

/// Drop columns that are empty in every row. Runs before renaming, so the
/// rename list must match the surviving column count.
pub fn drop_empty_columns(table: RawTable) -> RawTable {
    if table.rows.is_empty() {
        return table;
    }
    let keep: Vec<usize> = (0..table.columns.len())
        .filter(|&i| table.rows.iter().any(|row| !row[i].is_empty()))
        .collect();
    if keep.len() == table.columns.len() {
        return table;
    }
    RawTable {
        columns: keep.iter().map(|&i| table.columns[i].clone()).collect(),
        rows: table
            .rows
            .into_iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect(),
    }
}

/// Drop exact-duplicate rows, keeping the first occurrence.
pub fn drop_duplicate_rows(table: RawTable) -> RawTable {
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let rows = table
        .rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();
    RawTable {
        columns: table.columns,
        rows,
    }
}

/// Rename columns positionally to the canonical names. A count mismatch is
/// a fatal configuration error.
pub fn rename_columns(table: RawTable, names: &[String]) -> Result<RawTable> {
    if names.len() != table.columns.len() {
        return Err(ReleveError::ColumnCount {
            expected: names.len(),
            found: table.columns.len(),
        });
    }
    Ok(RawTable {
        columns: names.to_vec(),
        rows: table.rows,
    })
}

/// Day-first date parsing; bank exports write 15/01/2024. The ISO form is
/// accepted too so re-ingested data parses. Failure degrades to None.
pub fn parse_date_dayfirst(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

/// Decimal-comma amounts become decimal-point and parse as f64. Unlike
/// dates, an unparseable amount is fatal: everything downstream leans on it.
pub fn parse_amount(raw: &str, column: &str) -> Result<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ReleveError::Amount {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

/// Full cleaning pipeline: raw concatenated table in, canonical records out.
///
/// The table-level steps run in a fixed order (empty columns, duplicates,
/// rename) because the typed extraction depends on the renamed headers.
pub fn clean(table: RawTable, config: &Config) -> Result<Vec<Transaction>> {
    if table.rows.is_empty() {
        return Ok(Vec::new());
    }
    let table = drop_empty_columns(table);
    let table = drop_duplicate_rows(table);
    let table = rename_columns(table, &config.rename_columns)?;

    let index_of = |name: &str| -> Result<usize> {
        table
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReleveError::Config(format!("column '{name}' not found after rename")))
    };
    let idx_date = index_of(&config.date_column)?;
    let idx_details = index_of(&config.description_column)?;
    let idx_amount = index_of(&config.amount_column)?;
    let idx_account = index_of(COL_ACCOUNT)?;

    let mut cleaned = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let date = parse_date_dayfirst(&row[idx_date]);
        let amount = parse_amount(&row[idx_amount], &config.amount_column)?;
        let mut txn = Transaction::new(date, row[idx_details].clone(), amount);
        txn.currency = config.currency.clone();
        txn.account = row[idx_account].clone();
        txn.extra = table
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| ![idx_date, idx_details, idx_amount, idx_account].contains(i))
            .map(|(i, name)| (name.clone(), row[i].clone()))
            .collect();
        cleaned.push(txn);
    }
    Ok(cleaned)
}
