//! Loyalty Events - Ledger notifications
//!
//! Every committed state change emits one `LoyaltyEvent`. Delivery is
//! fire-and-forget: a failing sink never rolls back the ledger.
//! - `EventSink`: destination trait
//! - `JsonlEventStore`: append-only JSONL files, rotated per day
//! - `EventReader`: sequential reader over those files
//! - `MemorySink`: in-process recorder

pub mod error;
pub mod event;
pub mod reader;
pub mod sink;
pub mod store;

pub use error::EventError;
pub use event::{EventEnvelope, LoyaltyEvent};
pub use reader::EventReader;
pub use sink::{EventSink, MemorySink, NullSink};
pub use store::JsonlEventStore;
