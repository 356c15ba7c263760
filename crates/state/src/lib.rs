//! Loyalty State - World state access
//!
//! Every record of the loyalty ledger lives in an ordered key-value store.
//! This crate provides:
//! - `key`: injective composite keys (`\0NAMESPACE\0part\0part\0`) and prefix scans
//! - `StateStore`: the storage seam (`MemoryStore`, `SqliteStore`)
//! - `Transaction`: read-your-writes buffer committed as one atomic batch,
//!   rejected with `StateError::Conflict` if anything it read has changed

pub mod error;
pub mod key;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod transaction;

pub use error::StateError;
pub use key::{make_key, partial_key};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{KeyValue, ReadSet, StateIter, StateStore, WriteBatch};
pub use transaction::Transaction;
