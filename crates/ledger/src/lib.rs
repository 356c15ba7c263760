//! Loyalty Ledger - Points issuance, approval and transfer
//!
//! `LoyaltyLedger` runs every operation as one transaction over a
//! `StateStore`: the caller is checked against the access-control table,
//! writes are buffered, and the batch is committed only if the whole
//! operation succeeds. Events are published after the commit.
//!
//! - `workflow`: issuance/burn requests and approvals
//! - `transfer`: point transfers between members
//! - `purchase`: purchase records settled with a transfer
//! - `members`: member registration
//! - `queries`: read-only accessors

pub mod config;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod members;
pub mod purchase;
pub mod queries;
mod scope;
pub mod transfer;
pub mod workflow;

pub use config::{BurnPolicy, LedgerConfig};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use keys::Namespace;
pub use ledger::LoyaltyLedger;
