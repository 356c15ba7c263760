//! Typed operations parsed from a function name and positional arguments

use loyalty_core::{Function, Points, RequestKind};
use loyalty_ledger::{LedgerError, LedgerResult};
use std::str::FromStr;

/// One invocable operation with its arguments, in call order.
///
/// Initialization is not among them: it runs only through the bootstrap
/// command, never through `invoke`.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    RequestRewardPoints {
        quantity: Points,
        member_id: String,
    },
    GetRequestDetailByRequestId {
        request_id: String,
        kind: RequestKind,
    },
    GetAllRewardRequestDetails,
    GetAllBurnRequestDetails,
    ApproveRequest {
        request_id: String,
        approver_id: String,
        kind: RequestKind,
    },
    SetMembershipIdentities {
        member_id: String,
        first_name: String,
        last_name: String,
        phone: String,
    },
    GetAllMemberDetails,
    GetMemberDetailsByMemberId {
        member_id: String,
    },
    BurnRewardPoints {
        quantity: Points,
        member_id: String,
    },
    GetRewardPoints,
    GetAllAclConditions,
    GetAclConditionsByFuncAndOrg {
        function: String,
        org: String,
    },
    UpdatePurchase {
        purchase_id: String,
        purchaser_id: String,
        receipt_ref: String,
        receipt_digest: String,
        eligible_points: Points,
        member_id: String,
    },
    GetPurchaseDetailsByPurchaseId {
        purchase_id: String,
    },
    GetAllPurchaseDetails,
    TransferRewardPoints {
        from: String,
        to: String,
        quantity: Points,
        remark: String,
    },
    GetTransferDetailByTransferId {
        transfer_id: String,
    },
    GetAllTransferDetails,
    GetRewardPointsBalanceByMemberId {
        member_id: String,
    },
}

impl Operation {
    /// Parse `name(args...)`.
    ///
    /// Unknown names, internal-only functions, a wrong argument count and
    /// unparsable numbers or kinds are all `InvalidArgument`.
    pub fn parse(name: &str, args: &[String]) -> LedgerResult<Self> {
        let function = Function::from_str(name)
            .map_err(|_| LedgerError::InvalidArgument(format!("unknown function {}", name)))?;
        if !function.is_invocable() {
            return Err(LedgerError::InvalidArgument(format!(
                "{} cannot be invoked directly",
                name
            )));
        }

        let op = match function {
            Function::RequestRewardPoints => {
                let [quantity, member_id] = take::<2>(name, args)?;
                Operation::RequestRewardPoints {
                    quantity: Points::parse_positive(quantity)?,
                    member_id: member_id.clone(),
                }
            }
            Function::GetRequestDetailByRequestId => {
                let [request_id, kind] = take::<2>(name, args)?;
                Operation::GetRequestDetailByRequestId {
                    request_id: request_id.clone(),
                    kind: parse_kind(kind)?,
                }
            }
            Function::GetAllRewardRequestDetails => {
                take::<0>(name, args)?;
                Operation::GetAllRewardRequestDetails
            }
            Function::GetAllBurnRequestDetails => {
                take::<0>(name, args)?;
                Operation::GetAllBurnRequestDetails
            }
            Function::ApproveRequest => {
                let [request_id, approver_id, kind] = take::<3>(name, args)?;
                Operation::ApproveRequest {
                    request_id: request_id.clone(),
                    approver_id: approver_id.clone(),
                    kind: parse_kind(kind)?,
                }
            }
            Function::SetMembershipIdentities => {
                let [member_id, first_name, last_name, phone] = take::<4>(name, args)?;
                Operation::SetMembershipIdentities {
                    member_id: member_id.clone(),
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    phone: phone.clone(),
                }
            }
            Function::GetAllMemberDetails => {
                take::<0>(name, args)?;
                Operation::GetAllMemberDetails
            }
            Function::GetMemberDetailsByMemberId => {
                let [member_id] = take::<1>(name, args)?;
                Operation::GetMemberDetailsByMemberId {
                    member_id: member_id.clone(),
                }
            }
            Function::BurnRewardPoints => {
                let [quantity, member_id] = take::<2>(name, args)?;
                Operation::BurnRewardPoints {
                    quantity: Points::parse_positive(quantity)?,
                    member_id: member_id.clone(),
                }
            }
            Function::GetRewardPoints => {
                take::<0>(name, args)?;
                Operation::GetRewardPoints
            }
            Function::GetAllAclConditions => {
                take::<0>(name, args)?;
                Operation::GetAllAclConditions
            }
            Function::GetAclConditionsByFuncAndOrg => {
                let [function, org] = take::<2>(name, args)?;
                Operation::GetAclConditionsByFuncAndOrg {
                    function: function.clone(),
                    org: org.clone(),
                }
            }
            Function::UpdatePurchase => {
                let [purchase_id, purchaser_id, receipt_ref, receipt_digest, eligible, member_id] =
                    take::<6>(name, args)?;
                Operation::UpdatePurchase {
                    purchase_id: purchase_id.clone(),
                    purchaser_id: purchaser_id.clone(),
                    receipt_ref: receipt_ref.clone(),
                    receipt_digest: receipt_digest.clone(),
                    eligible_points: Points::from_str(eligible)?,
                    member_id: member_id.clone(),
                }
            }
            Function::GetPurchaseDetailsByPurchaseId => {
                let [purchase_id] = take::<1>(name, args)?;
                Operation::GetPurchaseDetailsByPurchaseId {
                    purchase_id: purchase_id.clone(),
                }
            }
            Function::GetAllPurchaseDetails => {
                take::<0>(name, args)?;
                Operation::GetAllPurchaseDetails
            }
            Function::TransferRewardPoints => {
                let [from, to, quantity, remark] = take::<4>(name, args)?;
                Operation::TransferRewardPoints {
                    from: from.clone(),
                    to: to.clone(),
                    quantity: Points::parse_positive(quantity)?,
                    remark: remark.clone(),
                }
            }
            Function::GetTransferDetailByTransferId => {
                let [transfer_id] = take::<1>(name, args)?;
                Operation::GetTransferDetailByTransferId {
                    transfer_id: transfer_id.clone(),
                }
            }
            Function::GetAllTransferDetails => {
                take::<0>(name, args)?;
                Operation::GetAllTransferDetails
            }
            Function::GetRewardPointsBalanceByMemberId => {
                let [member_id] = take::<1>(name, args)?;
                Operation::GetRewardPointsBalanceByMemberId {
                    member_id: member_id.clone(),
                }
            }
            Function::QuickTransfer | Function::Initialize => {
                return Err(LedgerError::InvalidArgument(format!(
                    "{} cannot be invoked directly",
                    name
                )))
            }
        };
        Ok(op)
    }
}

fn take<'a, const N: usize>(name: &str, args: &'a [String]) -> LedgerResult<[&'a String; N]> {
    if args.len() != N {
        return Err(LedgerError::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            name,
            N,
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| &args[i]))
}

fn parse_kind(value: &str) -> LedgerResult<RequestKind> {
    RequestKind::from_str(value).map_err(|_| {
        LedgerError::InvalidArgument(format!(
            "request kind must be ISSUE_REQUEST or BURN_REQUEST, got {:?}",
            value
        ))
    })
}
