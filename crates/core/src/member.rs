//! Member records

use crate::points::Points;
use serde::{Deserialize, Serialize};

/// A registered participant holding a reward point balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Externally assigned, unique member identifier
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,

    /// Organizational identity copied from the registering credential
    pub org: String,
    pub dept: String,
    pub role: String,

    /// Unique identifier of the credential this member is bound to
    pub public_key: String,
    pub msp_id: String,

    /// Current balance (never negative)
    pub reward_points: Points,
}

impl Member {
    /// Whether the given attested identifier owns this member record
    pub fn is_owned_by(&self, unique_id: &str) -> bool {
        !self.public_key.is_empty() && self.public_key == unique_id
    }
}
