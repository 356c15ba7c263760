//! World state errors

use thiserror::Error;

/// Errors from key construction and the underlying store
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt state: {0}")]
    Corrupt(String),

    /// A value read by the transaction was changed by another writer
    #[error("Write conflict on {0}, retry the operation")]
    Conflict(String),
}

impl StateError {
    /// Whether running the operation again may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, StateError::Conflict(_))
    }
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
