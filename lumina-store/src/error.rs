//! Error types for the store layer.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached in time (busy, locked, not openable).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other database error from SQLite.
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    /// A record with the same key string already exists.
    #[error("duplicate license key")]
    DuplicateKey,

    /// Record not found.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A stored field could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Returns true for transient faults the caller may retry.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen) => {
                Self::Unavailable(err.to_string())
            }
            Some(ErrorCode::ConstraintViolation) => Self::DuplicateKey,
            _ => Self::Database(err),
        }
    }
}
