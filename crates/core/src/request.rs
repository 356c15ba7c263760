//! Issuance and burn requests

use crate::points::Points;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, Display, EnumString};

/// Kind of request, doubling as its storage namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    /// Mint points into the requester's balance
    IssueRequest,
    /// Retire points held by the requester
    BurnRequest,
}

/// Lifecycle of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Created, no approvals yet
    Requested,
    /// Some approvals collected, threshold not reached
    PendingApproval,
    /// Threshold reached
    Issued,
    /// Threshold reached and the burned quantity has been retired
    SettledUp,
}

impl RequestStatus {
    /// Whether the approval threshold has already been met
    pub fn is_final(&self) -> bool {
        matches!(self, RequestStatus::Issued | RequestStatus::SettledUp)
    }
}

/// One approver's sign-off
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDetails {
    pub approved_by: String,
    pub approved_date: NaiveDate,
}

/// A request to mint or burn reward points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub request_id: String,
    pub request_kind: RequestKind,
    pub reward_points: Points,
    pub request_status: RequestStatus,
    pub requested_by: String,
    pub requested_date: NaiveDate,
    #[serde(default)]
    pub issued_date: Option<NaiveDate>,

    /// Approver member id -> approval details
    #[serde(default)]
    pub approvals: BTreeMap<String, ApprovalDetails>,
}

impl Request {
    /// Create a freshly submitted request with no approvals
    pub fn new(
        request_id: impl Into<String>,
        request_kind: RequestKind,
        reward_points: Points,
        requested_by: impl Into<String>,
        requested_date: NaiveDate,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            request_kind,
            reward_points,
            request_status: RequestStatus::Requested,
            requested_by: requested_by.into(),
            requested_date,
            issued_date: None,
            approvals: BTreeMap::new(),
        }
    }

    /// Check if a member has already approved
    pub fn has_approved(&self, member_id: &str) -> bool {
        self.approvals.contains_key(member_id)
    }

    /// Record an approval (returns false if this approver already signed)
    pub fn add_approval(&mut self, member_id: &str, date: NaiveDate) -> bool {
        if self.has_approved(member_id) {
            return false;
        }

        self.approvals.insert(
            member_id.to_string(),
            ApprovalDetails {
                approved_by: member_id.to_string(),
                approved_date: date,
            },
        );
        true
    }

    /// Number of distinct approvers
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }
}
