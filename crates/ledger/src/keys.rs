//! World state layout
//!
//! Records live under composite keys in five namespaces. Three singleton
//! keys hold the counters and the access-control table.

use crate::error::{LedgerError, LedgerResult};
use loyalty_core::RequestKind;
use loyalty_state::{make_key, partial_key};
use strum_macros::{AsRefStr, Display};

/// Remaining supply, decimal ASCII
pub const TOTAL_REWARD_POINTS: &str = "TOTAL_REWARD_POINTS";

/// Shared request/transfer sequence, decimal ASCII
pub const REQUEST_NO: &str = "REQUEST_NO";

/// Access-control table, JSON object keyed by function name
pub const ACCESS_CONTROL_LIST: &str = "ACCESS_CONTROL_LIST";

/// Composite key namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Namespace {
    Member,
    IssueRequest,
    BurnRequest,
    Transfer,
    PurchaseRefId,
}

impl From<RequestKind> for Namespace {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::IssueRequest => Namespace::IssueRequest,
            RequestKind::BurnRequest => Namespace::BurnRequest,
        }
    }
}

/// Scan prefix covering a whole namespace
pub fn namespace_prefix(namespace: Namespace) -> LedgerResult<String> {
    Ok(partial_key(namespace.as_ref(), &[])?)
}

pub fn member_key(member_id: &str) -> LedgerResult<String> {
    require_id("member id", member_id)?;
    Ok(make_key(Namespace::Member.as_ref(), &[member_id])?)
}

pub fn request_key(kind: RequestKind, request_id: &str) -> LedgerResult<String> {
    require_id("request id", request_id)?;
    Ok(make_key(Namespace::from(kind).as_ref(), &[request_id])?)
}

pub fn transfer_key(transfer_id: &str) -> LedgerResult<String> {
    require_id("transfer id", transfer_id)?;
    Ok(make_key(Namespace::Transfer.as_ref(), &[transfer_id])?)
}

/// Purchases are keyed by the issuing organization, then the purchase id
pub fn purchase_key(org: &str, purchase_id: &str) -> LedgerResult<String> {
    require_id("organization", org)?;
    require_id("purchase id", purchase_id)?;
    Ok(make_key(Namespace::PurchaseRefId.as_ref(), &[org, purchase_id])?)
}

/// Identifier of the `n`th request
pub fn request_id(sequence: u64) -> String {
    format!("REQUEST_{}", sequence)
}

/// Identifier of the `n`th transfer
pub fn transfer_id(sequence: u64) -> String {
    format!("TRANSFER_{}", sequence)
}

fn require_id(what: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidArgument(format!("{} cannot be empty", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_namespace_names() {
        assert_eq!(Namespace::PurchaseRefId.as_ref(), "PURCHASE_REF_ID");
        assert_eq!(Namespace::from(RequestKind::BurnRequest).as_ref(), "BURN_REQUEST");
    }

    #[test]
    fn test_request_kinds_do_not_collide() {
        let issue = request_key(RequestKind::IssueRequest, "REQUEST_1").unwrap();
        let burn = request_key(RequestKind::BurnRequest, "REQUEST_1").unwrap();
        assert_ne!(issue, burn);
        assert!(issue.starts_with(&namespace_prefix(Namespace::IssueRequest).unwrap()));
        assert!(!burn.starts_with(&namespace_prefix(Namespace::IssueRequest).unwrap()));
    }

    #[test]
    fn test_ids() {
        assert_eq!(request_id(7), "REQUEST_7");
        assert_eq!(transfer_id(8), "TRANSFER_8");
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(member_key("").unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            member_key("bad\u{0}id").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            purchase_key("HILTON", " ").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}
