//! Ledger errors

use loyalty_acl::AclError;
use loyalty_core::{Points, PointsError};
use loyalty_state::StateError;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("{approver} has already approved {request_id}")]
    AlreadyApproved { request_id: String, approver: String },

    #[error("Insufficient balance for {holder}: available {available}, required {required}")]
    InsufficientBalance {
        holder: String,
        available: Points,
        required: Points,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Store(StateError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Taxonomy tag reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    AlreadyExists,
    AlreadyApproved,
    InsufficientBalance,
    InvalidArgument,
    StoreError,
    EncodingError,
}

impl LedgerError {
    /// Taxonomy tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LedgerError::AlreadyApproved { .. } => ErrorKind::AlreadyApproved,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LedgerError::Store(_) => ErrorKind::StoreError,
            LedgerError::Encoding(_) => ErrorKind::EncodingError,
        }
    }

    /// Whether the operation lost a race with another writer and may be
    /// submitted again unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Store(err) if err.is_conflict())
    }
}

impl From<StateError> for LedgerError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::InvalidKey(msg) => LedgerError::InvalidArgument(msg),
            other => LedgerError::Store(other),
        }
    }
}

impl From<PointsError> for LedgerError {
    fn from(err: PointsError) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}

impl From<AclError> for LedgerError {
    fn from(err: AclError) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
