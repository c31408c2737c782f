use std::path::Path;

use crate::cleaner::{parse_amount, parse_date_dayfirst};
use crate::config::Config;
use crate::error::{ReleveError, Result};
use crate::models::{
    DebitCredit, Transaction, COL_ACCOUNT, COL_CATEGORY, COL_CURRENCY, COL_DEBIT_CREDIT,
    COL_IS_MANUAL, COL_MONTH, COL_SUBCATEGORY, COL_YEAR,
};

/// Output header: canonical columns first, then the union of passthrough
/// columns in first-seen order.
pub fn header(rows: &[Transaction], config: &Config) -> Vec<String> {
    let mut columns = vec![
        config.date_column.clone(),
        config.description_column.clone(),
        config.amount_column.clone(),
        COL_CURRENCY.to_string(),
        COL_ACCOUNT.to_string(),
        COL_DEBIT_CREDIT.to_string(),
        COL_MONTH.to_string(),
        COL_YEAR.to_string(),
        COL_CATEGORY.to_string(),
        COL_SUBCATEGORY.to_string(),
        COL_IS_MANUAL.to_string(),
    ];
    for row in rows {
        for (name, _) in &row.extra {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

/// Full overwrite of the dataset file: comma-separated, header row, no
/// index column.
pub fn write(path: &Path, rows: &[Transaction], config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    let columns = header(rows, config);
    writer.write_record(&columns)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| row.field(c, config).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the accumulated dataset; a missing file is an empty dataset.
/// Date/Details/Amount are required; the derived columns are re-derived
/// when absent so a hand-trimmed file still loads. Dates that no longer
/// parse degrade to empty, as on first ingest.
pub fn load(path: &Path, config: &Config) -> Result<Vec<Transaction>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        position(name).ok_or_else(|| {
            ReleveError::Dataset(format!(
                "{}: missing column '{name}'",
                path.display()
            ))
        })
    };
    let idx_date = required(&config.date_column)?;
    let idx_details = required(&config.description_column)?;
    let idx_amount = required(&config.amount_column)?;
    let canonical = [
        idx_date,
        idx_details,
        idx_amount,
        position(COL_CURRENCY).unwrap_or(usize::MAX),
        position(COL_ACCOUNT).unwrap_or(usize::MAX),
        position(COL_DEBIT_CREDIT).unwrap_or(usize::MAX),
        position(COL_MONTH).unwrap_or(usize::MAX),
        position(COL_YEAR).unwrap_or(usize::MAX),
        position(COL_CATEGORY).unwrap_or(usize::MAX),
        position(COL_SUBCATEGORY).unwrap_or(usize::MAX),
        position(COL_IS_MANUAL).unwrap_or(usize::MAX),
    ];

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let get = |name: &str| position(name).and_then(|i| record.get(i)).unwrap_or("");

        let date = parse_date_dayfirst(record.get(idx_date).unwrap_or(""));
        let amount = parse_amount(
            record.get(idx_amount).unwrap_or(""),
            &config.amount_column,
        )?;
        let mut txn = Transaction::new(
            date,
            record.get(idx_details).unwrap_or("").to_string(),
            amount,
        );
        txn.currency = match position(COL_CURRENCY) {
            Some(i) => record.get(i).unwrap_or("").to_string(),
            None => config.currency.clone(),
        };
        txn.account = get(COL_ACCOUNT).to_string();
        if get(COL_DEBIT_CREDIT) == "Credit" {
            txn.debit_credit = DebitCredit::Credit;
        } else if get(COL_DEBIT_CREDIT) == "Debit" {
            txn.debit_credit = DebitCredit::Debit;
        }
        if let Ok(month) = get(COL_MONTH).parse::<u32>() {
            txn.month = Some(month);
        }
        if let Ok(year) = get(COL_YEAR).parse::<i32>() {
            txn.year = Some(year);
        }
        if position(COL_CATEGORY).is_some() {
            txn.category = get(COL_CATEGORY).to_string();
        }
        if position(COL_SUBCATEGORY).is_some() {
            txn.subcategory = get(COL_SUBCATEGORY).to_string();
        }
        txn.is_manual = get(COL_IS_MANUAL).eq_ignore_ascii_case("true");
        txn.extra = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !canonical.contains(i))
            .map(|(i, name)| (name.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(txn);
    }
    Ok(rows)
}

/// Ascending by date, stable, rows without a date last.
pub fn sort_by_date(rows: &mut [Transaction]) {
    rows.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_rows(config: &Config) -> Vec<Transaction> {
        let mut a = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 15),
            "CARREFOUR PARIS".to_string(),
            -12.5,
        );
        a.currency = config.currency.clone();
        a.account = "ACC00012345".to_string();
        a.category = "food".to_string();
        a.subcategory = "groceries".to_string();
        a.extra
            .push(("Valuta".to_string(), "16/01/2024".to_string()));

        let mut b = Transaction::new(None, "CHEQUE 0000123".to_string(), -40.0);
        b.currency = config.currency.clone();
        b.account = "ACC00012345".to_string();
        b.is_manual = true;
        b.extra.push(("Valuta".to_string(), String::new()));

        vec![a, b]
    }

    #[test]
    fn test_write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_data.csv");
        let config = Config::example();
        let rows = sample_rows(&config);

        write(&path, &rows, &config).unwrap();
        let loaded = load(&path, &config).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_header_puts_canonical_columns_first() {
        let config = Config::example();
        let columns = header(&sample_rows(&config), &config);
        assert_eq!(
            &columns[..3],
            &["Date".to_string(), "Details".to_string(), "Amount".to_string()]
        );
        assert_eq!(columns.last().unwrap(), "Valuta");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let config = Config::example();
        let rows = load(Path::new("/nonexistent/final_data.csv"), &config).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_load_requires_amount_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_data.csv");
        std::fs::write(&path, "Date,Details\n2024-01-15,X\n").unwrap();
        let config = Config::example();
        let err = load(&path, &config).unwrap_err();
        assert!(err.to_string().contains("Amount"));
    }

    #[test]
    fn test_load_rederives_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_data.csv");
        std::fs::write(&path, "Date,Details,Amount\n2024-01-15,X,12.5\n").unwrap();
        let config = Config::example();
        let rows = load(&path, &config).unwrap();
        assert_eq!(rows[0].debit_credit, DebitCredit::Credit);
        assert_eq!(rows[0].month, Some(1));
        assert_eq!(rows[0].year, Some(2024));
        assert_eq!(rows[0].category, "other");
        assert_eq!(rows[0].currency, "EUR");
        assert!(!rows[0].is_manual);
    }

    #[test]
    fn test_sort_by_date_is_stable_with_missing_dates_last() {
        let mk = |date: Option<NaiveDate>, details: &str| {
            Transaction::new(date, details.to_string(), -1.0)
        };
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1);
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1);
        let mut rows = vec![
            mk(None, "undated"),
            mk(feb, "feb-first"),
            mk(jan, "jan"),
            mk(feb, "feb-second"),
        ];
        sort_by_date(&mut rows);
        let order: Vec<&str> = rows.iter().map(|t| t.details.as_str()).collect();
        assert_eq!(order, vec!["jan", "feb-first", "feb-second", "undated"]);
    }
}
