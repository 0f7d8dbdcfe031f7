//! Error types for acc-output.

use thiserror::Error;

/// Errors that can occur when exporting results.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A second result table whose columns differ from the first.
    #[error("column mismatch: expected {expected:?}, got {got:?}")]
    ColumnMismatch { expected: Vec<String>, got: Vec<String> },
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
