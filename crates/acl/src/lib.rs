//! Loyalty ACL - Access control engine
//!
//! Every gated operation is checked against a table mapping function names to
//! the (organization, department, role) triples allowed to call it:
//! - `PolicyDocument`: the JSON policy supplied at initialization
//! - `AccessControlTable`: the loaded table, replaced only by re-initialization
//! - `AccessDecision`: outcome of `AccessControlTable::authorize`

pub mod error;
pub mod policy;
pub mod table;

pub use error::AclError;
pub use policy::{AclTriple, FunctionConditions, PolicyDocument};
pub use table::{check_credential, AccessControlTable, AccessDecision, DenialReason};
