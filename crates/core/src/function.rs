//! Gated function names
//!
//! Every operation exposed to callers is identified by one of these names.
//! Access-control policies grant (organization, department, role) triples
//! per function name.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Closed set of function names understood by the ledger
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr,
    EnumIter,
)]
pub enum Function {
    #[strum(serialize = "requestRewardPoints")]
    #[serde(rename = "requestRewardPoints")]
    RequestRewardPoints,

    #[strum(serialize = "getRequestDetailByRequestID")]
    #[serde(rename = "getRequestDetailByRequestID")]
    GetRequestDetailByRequestId,

    #[strum(serialize = "getAllRewardRequestDetails")]
    #[serde(rename = "getAllRewardRequestDetails")]
    GetAllRewardRequestDetails,

    #[strum(serialize = "getAllBurnRequestDetails")]
    #[serde(rename = "getAllBurnRequestDetails")]
    GetAllBurnRequestDetails,

    #[strum(serialize = "approveRequest")]
    #[serde(rename = "approveRequest")]
    ApproveRequest,

    #[strum(serialize = "setMembershipIdentities")]
    #[serde(rename = "setMembershipIdentities")]
    SetMembershipIdentities,

    #[strum(serialize = "getAllMemberDetails")]
    #[serde(rename = "getAllMemberDetails")]
    GetAllMemberDetails,

    #[strum(serialize = "getMemberDetailsByMemberID")]
    #[serde(rename = "getMemberDetailsByMemberID")]
    GetMemberDetailsByMemberId,

    #[strum(serialize = "burnRewardPoints")]
    #[serde(rename = "burnRewardPoints")]
    BurnRewardPoints,

    #[strum(serialize = "getRewardPoints")]
    #[serde(rename = "getRewardPoints")]
    GetRewardPoints,

    #[strum(serialize = "getAllACLConditions")]
    #[serde(rename = "getAllACLConditions")]
    GetAllAclConditions,

    #[strum(serialize = "getACLConditionsByFuncAndOrg")]
    #[serde(rename = "getACLConditionsByFuncAndOrg")]
    GetAclConditionsByFuncAndOrg,

    #[strum(serialize = "updatePurchase")]
    #[serde(rename = "updatePurchase")]
    UpdatePurchase,

    #[strum(serialize = "getPurchaseDetailsByPurchaseID")]
    #[serde(rename = "getPurchaseDetailsByPurchaseID")]
    GetPurchaseDetailsByPurchaseId,

    #[strum(serialize = "getAllPurchaseDetails")]
    #[serde(rename = "getAllPurchaseDetails")]
    GetAllPurchaseDetails,

    #[strum(serialize = "transferRewardPoints")]
    #[serde(rename = "transferRewardPoints")]
    TransferRewardPoints,

    #[strum(serialize = "getTransferDetailbyTransferID")]
    #[serde(rename = "getTransferDetailbyTransferID")]
    GetTransferDetailByTransferId,

    #[strum(serialize = "getAllTransferDetails")]
    #[serde(rename = "getAllTransferDetails")]
    GetAllTransferDetails,

    #[strum(serialize = "getRewardPointsBalanceByMemberID")]
    #[serde(rename = "getRewardPointsBalanceByMemberID")]
    GetRewardPointsBalanceByMemberId,

    /// Internal capability for settlement transfers; never invoked directly
    #[strum(serialize = "quickTransfer")]
    #[serde(rename = "quickTransfer")]
    QuickTransfer,

    /// Replacing the access-control table of a running program.
    /// The first initialization is the bootstrap and consults no table.
    #[strum(serialize = "init")]
    #[serde(rename = "init")]
    Initialize,
}

impl Function {
    /// Whether callers may invoke this function by name
    pub fn is_invocable(&self) -> bool {
        !matches!(self, Function::QuickTransfer | Function::Initialize)
    }

    /// The ACL entry consulted before running this function.
    ///
    /// Approvals are granted to whoever may request points.
    pub fn acl_entry(&self) -> Function {
        match self {
            Function::ApproveRequest => Function::RequestRewardPoints,
            other => *other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_round_trip_names() {
        for function in Function::iter() {
            let name = function.to_string();
            assert_eq!(Function::from_str(&name).unwrap(), function);
        }
    }

    #[test]
    fn test_exact_wire_names() {
        assert_eq!(Function::RequestRewardPoints.as_ref(), "requestRewardPoints");
        assert_eq!(
            Function::GetTransferDetailByTransferId.as_ref(),
            "getTransferDetailbyTransferID"
        );
        assert_eq!(Function::GetAllAclConditions.as_ref(), "getAllACLConditions");
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!(Function::from_str("mintForFree").is_err());
    }

    #[test]
    fn test_approve_uses_request_acl() {
        assert_eq!(Function::ApproveRequest.acl_entry(), Function::RequestRewardPoints);
        assert_eq!(Function::BurnRewardPoints.acl_entry(), Function::BurnRewardPoints);
        assert!(!Function::QuickTransfer.is_invocable());
        assert!(!Function::Initialize.is_invocable());
        assert_eq!(Function::Initialize.as_ref(), "init");
    }
}
