//! Member registration

use crate::error::{LedgerError, LedgerResult};
use crate::keys;
use crate::ledger::LoyaltyLedger;
use loyalty_core::{CallerAttributes, Function, Member, Points};
use loyalty_events::LoyaltyEvent;
use loyalty_state::StateStore;
use tracing::info;

impl<S: StateStore> LoyaltyLedger<S> {
    /// Register a member bound to the caller's credential.
    ///
    /// Organization, department, role, public key and MSP id are copied from
    /// the caller; the balance starts at zero.
    pub fn set_membership_identities(
        &mut self,
        caller: &CallerAttributes,
        member_id: &str,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> LedgerResult<String> {
        self.execute(caller, |scope| {
            scope.authorize(Function::SetMembershipIdentities)?;

            let key = keys::member_key(member_id)?;
            if scope.exists(&key)? {
                return Err(LedgerError::AlreadyExists(format!("member {}", member_id)));
            }

            let (org, dept, role) = scope.caller().triple().ok_or_else(|| {
                LedgerError::InvalidArgument("caller lacks Org, Dept or Role".to_string())
            })?;

            let member = Member {
                member_id: member_id.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                phone: phone.to_string(),
                org: org.to_string(),
                dept: dept.to_string(),
                role: role.to_string(),
                public_key: scope.caller().unique_id.clone(),
                msp_id: scope.caller().msp_id.clone(),
                reward_points: Points::ZERO,
            };

            scope.put_record(key, &member)?;
            scope.emit(LoyaltyEvent::MemberRegistered {
                member_id: member.member_id.clone(),
                public_key: member.public_key.clone(),
            });

            info!(member_id, org = %member.org, "Member registered");
            Ok(member.member_id)
        })
    }
}
