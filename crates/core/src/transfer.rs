//! Point transfer records

use crate::points::Points;
use serde::{Deserialize, Serialize};

/// An immutable record of points moved between two members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub transfer_id: String,
    pub from: String,
    pub to: String,
    pub value: Points,
    #[serde(default)]
    pub remarks: String,
}
