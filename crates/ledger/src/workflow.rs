//! Issuance and burn requests
//!
//! Lifecycle: `REQUESTED` on submission, `PENDING_APPROVAL` while approvals
//! are below `required_approvals`, then `ISSUED` (or `SETTLED_UP` for burns
//! under `BurnPolicy::Retire`). Points move exactly once, on the transition
//! into the final state.

use crate::config::BurnPolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::keys;
use crate::ledger::LoyaltyLedger;
use crate::scope::TxScope;
use loyalty_core::{CallerAttributes, Function, Points, Request, RequestKind, RequestStatus};
use loyalty_events::LoyaltyEvent;
use loyalty_state::StateStore;
use tracing::{debug, info};

impl<S: StateStore> LoyaltyLedger<S> {
    /// Ask for `quantity` points to be minted into `member_id`'s balance
    pub fn request_reward_points(
        &mut self,
        caller: &CallerAttributes,
        quantity: Points,
        member_id: &str,
    ) -> LedgerResult<String> {
        self.submit_request(caller, RequestKind::IssueRequest, quantity, member_id)
    }

    /// Ask for `quantity` points held by `member_id` to be retired
    pub fn burn_reward_points(
        &mut self,
        caller: &CallerAttributes,
        quantity: Points,
        member_id: &str,
    ) -> LedgerResult<String> {
        self.submit_request(caller, RequestKind::BurnRequest, quantity, member_id)
    }

    fn submit_request(
        &mut self,
        caller: &CallerAttributes,
        kind: RequestKind,
        quantity: Points,
        member_id: &str,
    ) -> LedgerResult<String> {
        self.execute(caller, |scope| {
            scope.authorize(match kind {
                RequestKind::IssueRequest => Function::RequestRewardPoints,
                RequestKind::BurnRequest => Function::BurnRewardPoints,
            })?;
            let quantity = Points::positive(quantity.value())?;
            scope.require_owner(member_id)?;

            let sequence = scope.next_sequence()?;
            let request_id = keys::request_id(sequence);
            let request = Request::new(&request_id, kind, quantity, member_id, scope.today());

            scope.put_record(keys::request_key(kind, &request_id)?, &request)?;

            let event = match kind {
                RequestKind::IssueRequest => LoyaltyEvent::RewardPointsRequested {
                    request_id: request_id.clone(),
                    reward_points: quantity,
                    requested_date: request.requested_date,
                    requested_by: request.requested_by.clone(),
                },
                RequestKind::BurnRequest => LoyaltyEvent::BurnRequested {
                    request_id: request_id.clone(),
                    reward_points: quantity,
                    requested_date: request.requested_date,
                    requested_by: request.requested_by.clone(),
                },
            };
            scope.emit(event);

            info!(request_id = %request_id, kind = %kind, quantity = %quantity, member_id, "Request submitted");
            Ok(request_id)
        })
    }

    /// Record `approver_id`'s approval of a request.
    ///
    /// Gated by the `requestRewardPoints` ACL entry. Returns the updated
    /// request.
    pub fn approve_request(
        &mut self,
        caller: &CallerAttributes,
        request_id: &str,
        approver_id: &str,
        kind: RequestKind,
    ) -> LedgerResult<Request> {
        self.execute(caller, |scope| {
            scope.authorize(Function::ApproveRequest)?;
            scope.require_owner(approver_id)?;

            let key = keys::request_key(kind, request_id)?;
            let mut request: Request = scope
                .get_record(&key)?
                .ok_or_else(|| LedgerError::NotFound(format!("{} {}", kind, request_id)))?;

            if !scope.config().allow_self_approval && request.requested_by == approver_id {
                return Err(LedgerError::PermissionDenied(format!(
                    "{} cannot approve their own request {}",
                    approver_id, request_id
                )));
            }

            let already_final = request.request_status.is_final();
            if !request.add_approval(approver_id, scope.today()) {
                return Err(LedgerError::AlreadyApproved {
                    request_id: request_id.to_string(),
                    approver: approver_id.to_string(),
                });
            }

            if request.approval_count() >= scope.config().required_approvals {
                if !already_final {
                    settle(scope, &mut request)?;
                }
            } else {
                request.request_status = RequestStatus::PendingApproval;
            }

            scope.put_record(key, &request)?;
            scope.emit(LoyaltyEvent::RequestApproved {
                request_id: request.request_id.clone(),
                request_kind: kind,
                approved_by: approver_id.to_string(),
                approved_date: scope.today(),
                request_status: request.request_status,
            });

            info!(
                request_id,
                approver_id,
                approvals = request.approval_count(),
                status = %request.request_status,
                "Request approved"
            );
            Ok(request)
        })
    }
}

/// Apply the effect of a request reaching its approval threshold
fn settle<S: StateStore + ?Sized>(scope: &mut TxScope<'_, S>, request: &mut Request) -> LedgerResult<()> {
    let quantity = request.reward_points;

    match request.request_kind {
        RequestKind::IssueRequest => {
            let supply = scope.supply()?;
            let remaining = supply.checked_sub(quantity).ok_or_else(|| {
                LedgerError::InsufficientBalance {
                    holder: keys::TOTAL_REWARD_POINTS.to_string(),
                    available: supply,
                    required: quantity,
                }
            })?;

            let mut requester = scope.load_member(&request.requested_by)?;
            requester.reward_points = requester
                .reward_points
                .checked_add(quantity)
                .ok_or_else(|| LedgerError::InvalidArgument("balance overflow".to_string()))?;

            scope.set_supply(remaining);
            scope.save_member(&requester)?;
            request.request_status = RequestStatus::Issued;
            debug!(member_id = %requester.member_id, minted = %quantity, "Points minted");
        }
        RequestKind::BurnRequest => match scope.config().burn_policy {
            BurnPolicy::RecordOnly => {
                request.request_status = RequestStatus::Issued;
            }
            BurnPolicy::Retire => {
                let mut requester = scope.load_member(&request.requested_by)?;
                let available = requester.reward_points;
                requester.reward_points = available.checked_sub(quantity).ok_or_else(|| {
                    LedgerError::InsufficientBalance {
                        holder: requester.member_id.clone(),
                        available,
                        required: quantity,
                    }
                })?;

                let supply = scope.supply()?;
                let restored = supply
                    .checked_add(quantity)
                    .ok_or_else(|| LedgerError::InvalidArgument("supply overflow".to_string()))?;

                scope.save_member(&requester)?;
                scope.set_supply(restored);
                request.request_status = RequestStatus::SettledUp;
                debug!(member_id = %requester.member_id, retired = %quantity, "Points retired");
            }
        },
    }

    request.issued_date = Some(scope.today());
    Ok(())
}
