//! Error types for SQLite storage.

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Statement could not be built or serialized.
    #[error("statement error: {0}")]
    Statement(#[from] quarry_core::Error),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No row matched the given primary key.
    #[error("no `{table}` row with key {key}")]
    NotFound {
        /// Table name.
        table: String,
        /// Key values, rendered as SQL literals.
        key: String,
    },
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;
