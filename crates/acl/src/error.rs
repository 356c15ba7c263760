//! ACL errors

use thiserror::Error;

/// Errors raised while loading a policy
#[derive(Debug, Error)]
pub enum AclError {
    #[error("Malformed policy document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Policy entry has an empty function name")]
    EmptyFunctionName,

    #[error("Incomplete condition for {function}: organization, department and role are required")]
    IncompleteCondition { function: String },
}

pub type AclResult<T> = Result<T, AclError>;
