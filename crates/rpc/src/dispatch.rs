//! Operation dispatch and response envelopes

use crate::operation::Operation;
use loyalty_core::CallerAttributes;
use loyalty_ledger::purchase::PurchaseReport;
use loyalty_ledger::{ErrorKind, LedgerError, LedgerResult, LoyaltyLedger};
use loyalty_state::StateStore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Run one operation against the ledger, returning its JSON payload
pub fn dispatch<S: StateStore>(
    ledger: &mut LoyaltyLedger<S>,
    caller: &CallerAttributes,
    op: Operation,
) -> LedgerResult<Value> {
    debug!(operation = ?op, caller = %caller.unique_id, "Dispatching");

    let payload = match op {
        Operation::RequestRewardPoints { quantity, member_id } => {
            json!({ "request_id": ledger.request_reward_points(caller, quantity, &member_id)? })
        }
        Operation::BurnRewardPoints { quantity, member_id } => {
            json!({ "request_id": ledger.burn_reward_points(caller, quantity, &member_id)? })
        }
        Operation::ApproveRequest {
            request_id,
            approver_id,
            kind,
        } => to_value(ledger.approve_request(caller, &request_id, &approver_id, kind)?)?,
        Operation::SetMembershipIdentities {
            member_id,
            first_name,
            last_name,
            phone,
        } => {
            let id = ledger.set_membership_identities(
                caller,
                &member_id,
                &first_name,
                &last_name,
                &phone,
            )?;
            json!({ "member_id": id })
        }
        Operation::UpdatePurchase {
            purchase_id,
            purchaser_id,
            receipt_ref,
            receipt_digest,
            eligible_points,
            member_id,
        } => {
            let id = ledger.update_purchase(
                caller,
                PurchaseReport {
                    purchase_id: &purchase_id,
                    purchaser_id: &purchaser_id,
                    receipt_ref: &receipt_ref,
                    receipt_digest: &receipt_digest,
                    eligible_points,
                    member_id: &member_id,
                },
            )?;
            json!({ "purchase_id": id })
        }
        Operation::TransferRewardPoints {
            from,
            to,
            quantity,
            remark,
        } => {
            json!({ "transfer_id": ledger.transfer_reward_points(caller, &from, &to, quantity, &remark)? })
        }
        Operation::GetRequestDetailByRequestId { request_id, kind } => {
            to_value(ledger.get_request_detail(caller, &request_id, kind)?)?
        }
        Operation::GetAllRewardRequestDetails => to_value(ledger.all_reward_requests(caller)?)?,
        Operation::GetAllBurnRequestDetails => to_value(ledger.all_burn_requests(caller)?)?,
        Operation::GetAllMemberDetails => to_value(ledger.all_members(caller)?)?,
        Operation::GetMemberDetailsByMemberId { member_id } => {
            to_value(ledger.member_details(caller, &member_id)?)?
        }
        Operation::GetRewardPoints => to_value(ledger.reward_points(caller)?)?,
        Operation::GetAllAclConditions => to_value(ledger.all_acl_conditions(caller)?)?,
        Operation::GetAclConditionsByFuncAndOrg { function, org } => {
            to_value(ledger.acl_conditions_by_func_and_org(caller, &function, &org)?)?
        }
        Operation::GetPurchaseDetailsByPurchaseId { purchase_id } => {
            to_value(ledger.purchase_details(caller, &purchase_id)?)?
        }
        Operation::GetAllPurchaseDetails => to_value(ledger.all_purchases(caller)?)?,
        Operation::GetTransferDetailByTransferId { transfer_id } => {
            to_value(ledger.transfer_details(caller, &transfer_id)?)?
        }
        Operation::GetAllTransferDetails => to_value(ledger.all_transfers(caller)?)?,
        Operation::GetRewardPointsBalanceByMemberId { member_id } => {
            to_value(ledger.balance_of(caller, &member_id)?)?
        }
    };
    Ok(payload)
}

fn to_value<T: Serialize>(value: T) -> LedgerResult<Value> {
    Ok(serde_json::to_value(value)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// Envelope returned for every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Response {
    pub fn ok(payload: Value) -> Self {
        Self {
            status: ResponseStatus::Ok,
            kind: None,
            message: None,
            payload: Some(payload),
        }
    }

    pub fn error(err: &LedgerError) -> Self {
        Self {
            status: ResponseStatus::Error,
            kind: Some(err.kind()),
            message: Some(err.to_string()),
            payload: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

impl From<LedgerResult<Value>> for Response {
    fn from(result: LedgerResult<Value>) -> Self {
        match result {
            Ok(payload) => Response::ok(payload),
            Err(err) => Response::error(&err),
        }
    }
}
