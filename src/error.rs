use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReleveError>;

#[derive(Debug, Error)]
pub enum ReleveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Column count mismatch: table has {found} columns but rename_columns lists {expected}")]
    ColumnCount { expected: usize, found: usize },

    #[error("Unparseable amount '{value}' in column '{column}'")]
    Amount { column: String, value: String },

    #[error("Rules error: {0}")]
    Rules(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("{0}")]
    Other(String),
}
