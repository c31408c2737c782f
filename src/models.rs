use chrono::{Datelike, NaiveDate};

use crate::config::Config;
use crate::error::{ReleveError, Result};

// Canonical column names shared by the cleaner, the dataset file and the
// browser. The date/details/amount column names come from the configuration;
// everything below is fixed.
pub const COL_CURRENCY: &str = "Currency";
pub const COL_ACCOUNT: &str = "Account";
pub const COL_DEBIT_CREDIT: &str = "Debit/Credit";
pub const COL_MONTH: &str = "Month";
pub const COL_YEAR: &str = "Year";
pub const COL_CATEGORY: &str = "Category";
pub const COL_SUBCATEGORY: &str = "Subcategory";
pub const COL_IS_MANUAL: &str = "is_manual";

pub const DEFAULT_CATEGORY: &str = "other";

/// A parsed-but-unrenamed table, straight out of the statement files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitCredit {
    Debit,
    Credit,
}

impl DebitCredit {
    /// Zero counts as a debit; only strictly positive amounts are credits.
    pub fn from_amount(amount: f64) -> Self {
        if amount > 0.0 {
            DebitCredit::Credit
        } else {
            DebitCredit::Debit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DebitCredit::Debit => "Debit",
            DebitCredit::Credit => "Credit",
        }
    }
}

/// One bank operation in the canonical schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: Option<NaiveDate>,
    pub details: String,
    pub amount: f64,
    pub currency: String,
    pub account: String,
    pub debit_credit: DebitCredit,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub category: String,
    pub subcategory: String,
    pub is_manual: bool,
    /// Passthrough columns from the raw export, in column order.
    pub extra: Vec<(String, String)>,
}

impl Transaction {
    pub fn new(date: Option<NaiveDate>, details: String, amount: f64) -> Self {
        Self {
            date,
            details,
            amount,
            currency: String::new(),
            account: String::new(),
            debit_credit: DebitCredit::from_amount(amount),
            month: date.map(|d| d.month()),
            year: date.map(|d| d.year()),
            category: DEFAULT_CATEGORY.to_string(),
            subcategory: DEFAULT_CATEGORY.to_string(),
            is_manual: false,
            extra: Vec::new(),
        }
    }

    /// The canonical string value of a named column, or None if the row has
    /// no such column. The same formatting is used for dataset writes and
    /// merge keys, so a re-read row always compares equal to a fresh one.
    pub fn field(&self, column: &str, config: &Config) -> Option<String> {
        if column == config.date_column {
            return Some(format_date(self.date));
        }
        if column == config.description_column {
            return Some(self.details.clone());
        }
        if column == config.amount_column {
            return Some(format_amount(self.amount));
        }
        match column {
            COL_CURRENCY => Some(self.currency.clone()),
            COL_ACCOUNT => Some(self.account.clone()),
            COL_DEBIT_CREDIT => Some(self.debit_credit.as_str().to_string()),
            COL_MONTH => Some(self.month.map(|m| m.to_string()).unwrap_or_default()),
            COL_YEAR => Some(self.year.map(|y| y.to_string()).unwrap_or_default()),
            COL_CATEGORY => Some(self.category.clone()),
            COL_SUBCATEGORY => Some(self.subcategory.clone()),
            COL_IS_MANUAL => Some(self.is_manual.to_string()),
            _ => self
                .extra
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.clone()),
        }
    }

    /// Compose the deduplication key from the configured key columns.
    /// Unknown column names are configuration errors.
    pub fn merge_key(&self, columns: &[String], config: &Config) -> Result<String> {
        let mut parts = Vec::with_capacity(columns.len());
        for column in columns {
            let value = self.field(column, config).ok_or_else(|| {
                ReleveError::Config(format!("unknown merge column '{column}'"))
            })?;
            parts.push(value);
        }
        Ok(parts.join("\u{1f}"))
    }
}

/// Shortest-roundtrip float display; what the dataset file stores.
pub fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

/// ISO date, or empty for an unparseable source date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_debit_credit_from_amount() {
        assert_eq!(DebitCredit::from_amount(12.5), DebitCredit::Credit);
        assert_eq!(DebitCredit::from_amount(-12.5), DebitCredit::Debit);
        assert_eq!(DebitCredit::from_amount(0.0), DebitCredit::Debit);
    }

    #[test]
    fn test_format_amount_roundtrips() {
        assert_eq!(format_amount(-12.5), "-12.5");
        assert_eq!(format_amount(3.0), "3");
        assert_eq!(format_amount(-0.07), "-0.07");
    }

    #[test]
    fn test_field_lookup() {
        let config = Config::example();
        let mut txn = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 15),
            "CARREFOUR PARIS".to_string(),
            -42.0,
        );
        txn.account = "ACC00012345".to_string();
        txn.extra.push(("Valuta".to_string(), "2024-01-16".to_string()));

        assert_eq!(txn.field("Date", &config).as_deref(), Some("2024-01-15"));
        assert_eq!(txn.field("Amount", &config).as_deref(), Some("-42"));
        assert_eq!(txn.field("Debit/Credit", &config).as_deref(), Some("Debit"));
        assert_eq!(txn.field("Month", &config).as_deref(), Some("1"));
        assert_eq!(txn.field("Valuta", &config).as_deref(), Some("2024-01-16"));
        assert_eq!(txn.field("Nope", &config), None);
    }

    #[test]
    fn test_merge_key_rejects_unknown_column() {
        let config = Config::example();
        let txn = Transaction::new(None, "X".to_string(), 1.0);
        let err = txn
            .merge_key(&["Nope".to_string()], &config)
            .unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }
}
