//! Loyalty Core - Domain types
//!
//! This crate contains the fundamental types shared by every loyalty crate:
//! - `Points`: Non-negative integer quantity of reward points
//! - `Member`, `Request`, `Transfer`, `Purchase`: persisted records
//! - `CallerAttributes`: attested identity of the transaction submitter
//! - `Function`: closed set of gated operation names

pub mod caller;
pub mod function;
pub mod member;
pub mod points;
pub mod purchase;
pub mod request;
pub mod transfer;

pub use caller::CallerAttributes;
pub use function::Function;
pub use member::Member;
pub use points::{Points, PointsError};
pub use purchase::{receipt_digest, Purchase};
pub use request::{ApprovalDetails, Request, RequestKind, RequestStatus};
pub use transfer::Transfer;
