//! Read-only accessors
//!
//! Each accessor is gated by its own function name and never writes. A
//! missing record is reported as `NotFound`; list accessors return every
//! record of their namespace in key order.

use crate::error::{LedgerError, LedgerResult};
use crate::keys::{self, Namespace};
use crate::ledger::LoyaltyLedger;
use crate::scope::TxScope;
use loyalty_acl::{AccessControlTable, AclTriple};
use loyalty_core::{
    CallerAttributes, Function, Member, Points, Purchase, Request, RequestKind, Transfer,
};
use loyalty_state::StateStore;
use serde::de::DeserializeOwned;

impl<S: StateStore> LoyaltyLedger<S> {
    pub fn get_request_detail(
        &mut self,
        caller: &CallerAttributes,
        request_id: &str,
        kind: RequestKind,
    ) -> LedgerResult<Request> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetRequestDetailByRequestId)?;
            required(scope, &keys::request_key(kind, request_id)?, || {
                format!("{} {}", kind, request_id)
            })
        })
    }

    pub fn all_reward_requests(&mut self, caller: &CallerAttributes) -> LedgerResult<Vec<Request>> {
        self.list(caller, Function::GetAllRewardRequestDetails, Namespace::IssueRequest)
    }

    pub fn all_burn_requests(&mut self, caller: &CallerAttributes) -> LedgerResult<Vec<Request>> {
        self.list(caller, Function::GetAllBurnRequestDetails, Namespace::BurnRequest)
    }

    pub fn member_details(
        &mut self,
        caller: &CallerAttributes,
        member_id: &str,
    ) -> LedgerResult<Member> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetMemberDetailsByMemberId)?;
            scope.load_member(member_id)
        })
    }

    pub fn all_members(&mut self, caller: &CallerAttributes) -> LedgerResult<Vec<Member>> {
        self.list(caller, Function::GetAllMemberDetails, Namespace::Member)
    }

    /// Points still available for issuance
    pub fn reward_points(&mut self, caller: &CallerAttributes) -> LedgerResult<Points> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetRewardPoints)?;
            scope.supply()
        })
    }

    pub fn balance_of(&mut self, caller: &CallerAttributes, member_id: &str) -> LedgerResult<Points> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetRewardPointsBalanceByMemberId)?;
            Ok(scope.load_member(member_id)?.reward_points)
        })
    }

    /// The whole access-control table.
    ///
    /// Gated by the `getAllACLConditions` entry, the name callers invoke. A
    /// policy that only grants `getACLConditions` does not cover it.
    pub fn all_acl_conditions(
        &mut self,
        caller: &CallerAttributes,
    ) -> LedgerResult<AccessControlTable> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetAllAclConditions)?;
            Ok(scope.acl().clone())
        })
    }

    /// Triples granted for `function` that belong to organization `org`
    pub fn acl_conditions_by_func_and_org(
        &mut self,
        caller: &CallerAttributes,
        function: &str,
        org: &str,
    ) -> LedgerResult<Vec<AclTriple>> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetAclConditionsByFuncAndOrg)?;
            Ok(scope.acl().conditions_for(function, org))
        })
    }

    /// Look up a purchase recorded by the caller's organization
    pub fn purchase_details(
        &mut self,
        caller: &CallerAttributes,
        purchase_id: &str,
    ) -> LedgerResult<Purchase> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetPurchaseDetailsByPurchaseId)?;
            let org = scope.caller_org()?;
            required(scope, &keys::purchase_key(org, purchase_id)?, || {
                format!("purchase {} in {}", purchase_id, org)
            })
        })
    }

    pub fn all_purchases(&mut self, caller: &CallerAttributes) -> LedgerResult<Vec<Purchase>> {
        self.list(caller, Function::GetAllPurchaseDetails, Namespace::PurchaseRefId)
    }

    pub fn transfer_details(
        &mut self,
        caller: &CallerAttributes,
        transfer_id: &str,
    ) -> LedgerResult<Transfer> {
        self.execute(caller, |scope| {
            scope.authorize(Function::GetTransferDetailByTransferId)?;
            required(scope, &keys::transfer_key(transfer_id)?, || {
                format!("transfer {}", transfer_id)
            })
        })
    }

    pub fn all_transfers(&mut self, caller: &CallerAttributes) -> LedgerResult<Vec<Transfer>> {
        self.list(caller, Function::GetAllTransferDetails, Namespace::Transfer)
    }

    fn list<T: DeserializeOwned>(
        &mut self,
        caller: &CallerAttributes,
        function: Function,
        namespace: Namespace,
    ) -> LedgerResult<Vec<T>> {
        self.execute(caller, |scope| {
            scope.authorize(function)?;
            scope.scan_records(namespace)
        })
    }
}

fn required<S, T>(
    scope: &TxScope<'_, S>,
    key: &str,
    describe: impl FnOnce() -> String,
) -> LedgerResult<T>
where
    S: StateStore + ?Sized,
    T: DeserializeOwned,
{
    scope
        .get_record(key)?
        .ok_or_else(|| LedgerError::NotFound(describe()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::purchase::PurchaseReport;
    use crate::LedgerConfig;
    use loyalty_acl::PolicyDocument;
    use loyalty_core::RequestStatus;
    use loyalty_state::MemoryStore;
    use strum::IntoEnumIterator;

    fn caller(unique_id: &str) -> CallerAttributes {
        CallerAttributes::application("HILTON", "Bangalore", "ADMIN", unique_id)
    }

    /// Every invocable function granted to HILTON/Bangalore/ADMIN
    fn setup() -> LoyaltyLedger<MemoryStore> {
        let admin = AclTriple::new("HILTON", "Bangalore", "ADMIN");
        let policy = Function::iter().fold(PolicyDocument::default(), |policy, function| {
            policy.grant(function.as_ref(), admin.clone())
        });
        let policy = policy
            .grant("getAllMemberDetails", AclTriple::new("AIRLINE", "Delhi", "AUDITOR"))
            .grant(
                "getPurchaseDetailsByPurchaseID",
                AclTriple::new("MARRIOTT", "Bangalore", "ADMIN"),
            );

        let mut ledger = LoyaltyLedger::open(MemoryStore::new(), LedgerConfig::default()).unwrap();
        ledger.initialize(&caller("x509::root"), &policy).unwrap();
        ledger
            .set_membership_identities(&caller("x509::m1"), "M1", "A", "One", "")
            .unwrap();
        ledger
            .set_membership_identities(&caller("x509::m2"), "M2", "B", "Two", "")
            .unwrap();
        ledger
    }

    #[test]
    fn test_request_accessors() {
        let mut ledger = setup();
        let who = caller("x509::m1");
        let issue = ledger.request_reward_points(&who, Points::new(100), "M1").unwrap();
        let burn = ledger.burn_reward_points(&who, Points::new(10), "M1").unwrap();

        let request = ledger
            .get_request_detail(&who, &issue, RequestKind::IssueRequest)
            .unwrap();
        assert_eq!(request.request_status, RequestStatus::Requested);
        assert_eq!(request.reward_points, Points::new(100));

        let wrong_kind = ledger
            .get_request_detail(&who, &issue, RequestKind::BurnRequest)
            .unwrap_err();
        assert_eq!(wrong_kind.kind(), ErrorKind::NotFound);

        assert_eq!(ledger.all_reward_requests(&who).unwrap().len(), 1);
        let burns = ledger.all_burn_requests(&who).unwrap();
        assert_eq!(burns.len(), 1);
        assert_eq!(burns[0].request_id, burn);
    }

    #[test]
    fn test_member_and_balance_accessors() {
        let mut ledger = setup();
        let who = caller("x509::m1");
        let id = ledger.request_reward_points(&who, Points::new(70), "M1").unwrap();
        ledger
            .approve_request(&caller("x509::m2"), &id, "M2", RequestKind::IssueRequest)
            .unwrap();

        assert_eq!(ledger.balance_of(&who, "M1").unwrap(), Points::new(70));
        assert_eq!(ledger.member_details(&who, "M2").unwrap().public_key, "x509::m2");
        assert_eq!(
            ledger.reward_points(&who).unwrap(),
            Points::new(crate::config::DEFAULT_INITIAL_SUPPLY - 70)
        );

        let members = ledger.all_members(&who).unwrap();
        let ids: Vec<_> = members.iter().map(|m| m.member_id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2"]);

        let missing = ledger.balance_of(&who, "M9").unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_acl_accessors() {
        let mut ledger = setup();
        let who = caller("x509::m1");

        let table = ledger.all_acl_conditions(&who).unwrap();
        assert_eq!(table.len(), Function::iter().count());

        let hilton = ledger
            .acl_conditions_by_func_and_org(&who, "getAllMemberDetails", "HILTON")
            .unwrap();
        assert_eq!(hilton, vec![AclTriple::new("HILTON", "Bangalore", "ADMIN")]);

        let airline = ledger
            .acl_conditions_by_func_and_org(&who, "getAllMemberDetails", "AIRLINE")
            .unwrap();
        assert_eq!(airline, vec![AclTriple::new("AIRLINE", "Delhi", "AUDITOR")]);

        let none = ledger
            .acl_conditions_by_func_and_org(&who, "noSuchFunction", "HILTON")
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_purchase_lookup_is_scoped_to_caller_org() {
        let mut ledger = setup();
        let who = caller("x509::m1");
        ledger
            .update_purchase(
                &who,
                PurchaseReport {
                    purchase_id: "P-1",
                    purchaser_id: "M2",
                    receipt_ref: "r-1",
                    receipt_digest: "d",
                    eligible_points: Points::ZERO,
                    member_id: "M1",
                },
            )
            .unwrap();

        assert_eq!(ledger.purchase_details(&who, "P-1").unwrap().purchase_by, "M2");
        assert_eq!(ledger.all_purchases(&who).unwrap().len(), 1);

        let other_org = CallerAttributes::application("MARRIOTT", "Bangalore", "ADMIN", "x509::m1");
        let err = ledger.purchase_details(&other_org, "P-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_transfer_accessors() {
        let mut ledger = setup();
        let id = ledger
            .request_reward_points(&caller("x509::m1"), Points::new(40), "M1")
            .unwrap();
        ledger
            .approve_request(&caller("x509::m2"), &id, "M2", RequestKind::IssueRequest)
            .unwrap();
        let transfer_id = ledger
            .transfer_reward_points(&caller("x509::m1"), "M1", "M2", Points::new(15), "thanks")
            .unwrap();

        let who = caller("x509::m2");
        let transfer = ledger.transfer_details(&who, &transfer_id).unwrap();
        assert_eq!(transfer.value, Points::new(15));
        assert_eq!(ledger.all_transfers(&who).unwrap(), vec![transfer]);

        let missing = ledger.transfer_details(&who, "TRANSFER_99").unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_full_table_needs_its_own_entry() {
        let mut ledger = LoyaltyLedger::open(MemoryStore::new(), LedgerConfig::default()).unwrap();
        let policy = PolicyDocument::default()
            .grant("getACLConditions", AclTriple::new("HILTON", "Bangalore", "ADMIN"));
        ledger.initialize(&caller("x509::root"), &policy).unwrap();

        let err = ledger.all_acl_conditions(&caller("x509::root")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_reads_are_gated() {
        let mut ledger = setup();
        let auditor = CallerAttributes::application("AIRLINE", "Delhi", "AUDITOR", "x509::audit");

        assert_eq!(ledger.all_members(&auditor).unwrap().len(), 2);
        let err = ledger.reward_points(&auditor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_reads_do_not_write() {
        let mut ledger = setup();
        let before = ledger.store().clone();
        let who = caller("x509::m1");

        ledger.all_members(&who).unwrap();
        ledger.reward_points(&who).unwrap();
        let _ = ledger.member_details(&who, "M9");

        assert_eq!(ledger.store().len(), before.len());
    }
}
