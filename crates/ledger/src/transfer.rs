//! Point transfers between members

use crate::error::{LedgerError, LedgerResult};
use crate::keys;
use crate::ledger::LoyaltyLedger;
use crate::scope::TxScope;
use loyalty_core::{CallerAttributes, Function, Points, Transfer};
use loyalty_events::LoyaltyEvent;
use loyalty_state::StateStore;
use tracing::info;

impl<S: StateStore> LoyaltyLedger<S> {
    /// Move `quantity` points from one member to another
    pub fn transfer_reward_points(
        &mut self,
        caller: &CallerAttributes,
        from: &str,
        to: &str,
        quantity: Points,
        remark: &str,
    ) -> LedgerResult<String> {
        self.execute(caller, |scope| {
            scope.authorize(Function::TransferRewardPoints)?;
            if scope.config().transfer_requires_owner {
                scope.require_owner(from)?;
            }

            let transfer = move_points(scope, from, to, quantity, remark)?;
            scope.emit(LoyaltyEvent::PointsTransferred {
                transfer_id: transfer.transfer_id.clone(),
                from: transfer.from.clone(),
                to: transfer.to.clone(),
                value: transfer.value,
            });

            info!(
                transfer_id = %transfer.transfer_id,
                from,
                to,
                value = %transfer.value,
                "Points transferred"
            );
            Ok(transfer.transfer_id)
        })
    }
}

/// Record a transfer and apply it to both balances.
///
/// The source balance is checked before anything is written. Shared by
/// direct transfers and purchase settlement.
pub(crate) fn move_points<S: StateStore + ?Sized>(
    scope: &mut TxScope<'_, S>,
    from: &str,
    to: &str,
    quantity: Points,
    remark: &str,
) -> LedgerResult<Transfer> {
    let quantity = Points::positive(quantity.value())?;
    if from == to {
        return Err(LedgerError::InvalidArgument(format!(
            "cannot transfer from {} to itself",
            from
        )));
    }

    let mut source = scope.load_member(from)?;
    let mut target = scope.load_member(to)?;

    let available = source.reward_points;
    source.reward_points =
        available
            .checked_sub(quantity)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                holder: from.to_string(),
                available,
                required: quantity,
            })?;
    target.reward_points = target
        .reward_points
        .checked_add(quantity)
        .ok_or_else(|| LedgerError::InvalidArgument(format!("balance overflow for {}", to)))?;

    let transfer = Transfer {
        transfer_id: keys::transfer_id(scope.next_sequence()?),
        from: from.to_string(),
        to: to.to_string(),
        value: quantity,
        remarks: remark.to_string(),
    };

    scope.put_record(keys::transfer_key(&transfer.transfer_id)?, &transfer)?;
    scope.save_member(&source)?;
    scope.save_member(&target)?;
    Ok(transfer)
}
