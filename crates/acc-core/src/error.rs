//! Configuration and argument error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced by `acc-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A categories filter was a bare value or an empty list.  Category
    /// filters must always be an explicit, non-empty list of names.
    #[error("categories must be a non-empty list of names, got {0}")]
    CategoryArgument(String),

    #[error("category {0:?} has no entry in the usage table")]
    UnknownCategory(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `acc-core`.
pub type CoreResult<T> = Result<T, CoreError>;
