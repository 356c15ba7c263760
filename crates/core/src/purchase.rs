//! Purchase records and receipt digests

use crate::points::Points;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A purchase reported by an organization, optionally settled with points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Caller-supplied id, unique within `issued_org`
    pub purchase_id: String,

    /// Reference to the receipt document
    pub receipt_ref: String,

    /// Integrity digest of the receipt document
    pub receipt_digest: String,

    pub issued_org: String,

    /// Member that authorized the purchase and funds the points
    pub issued_member: String,

    pub purchase_by: String,
    pub reward_pts_elig: Points,
    pub reward_pts_trans: Points,
    pub purchase_date: NaiveDate,

    /// Settlement transfer, absent when no points were eligible
    #[serde(default)]
    pub transfer_id: Option<String>,
}

/// Compute the SHA256 hex digest of a receipt document
pub fn receipt_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
