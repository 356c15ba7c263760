//! Purchase records and their point settlement

use crate::error::{LedgerError, LedgerResult};
use crate::keys;
use crate::ledger::LoyaltyLedger;
use crate::transfer::move_points;
use loyalty_core::{CallerAttributes, Function, Points, Purchase};
use loyalty_events::LoyaltyEvent;
use loyalty_state::StateStore;
use tracing::info;

/// Remark written on settlement transfers
pub const SETTLEMENT_REMARK: &str = "via Purchase";

/// Details of a purchase as reported by the issuing organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReport<'r> {
    pub purchase_id: &'r str,
    pub purchaser_id: &'r str,
    pub receipt_ref: &'r str,
    pub receipt_digest: &'r str,
    pub eligible_points: Points,
    /// Authorizing member; funds the eligible points
    pub member_id: &'r str,
}

impl<S: StateStore> LoyaltyLedger<S> {
    /// Record a purchase in the caller's organization and, when points are
    /// eligible, settle them from the authorizing member to the purchaser.
    ///
    /// The purchase and its settlement transfer commit together or not at all.
    pub fn update_purchase(
        &mut self,
        caller: &CallerAttributes,
        report: PurchaseReport<'_>,
    ) -> LedgerResult<String> {
        self.execute(caller, |scope| {
            scope.authorize(Function::UpdatePurchase)?;
            scope.require_owner(report.member_id)?;
            let org = scope.caller_org()?;

            if !scope.member_exists(report.purchaser_id)? {
                return Err(LedgerError::NotFound(format!(
                    "purchaser {}",
                    report.purchaser_id
                )));
            }

            let key = keys::purchase_key(org, report.purchase_id)?;
            if scope.exists(&key)? {
                return Err(LedgerError::AlreadyExists(format!(
                    "purchase {} in {}",
                    report.purchase_id, org
                )));
            }

            // Points earned by the authorizing member itself stay where they are
            let settles = !report.eligible_points.is_zero() && report.purchaser_id != report.member_id;
            let transfer_id = if settles {
                scope.authorize(Function::QuickTransfer)?;
                let transfer = move_points(
                    scope,
                    report.member_id,
                    report.purchaser_id,
                    report.eligible_points,
                    SETTLEMENT_REMARK,
                )?;
                Some(transfer.transfer_id)
            } else {
                None
            };

            let purchase = Purchase {
                purchase_id: report.purchase_id.to_string(),
                receipt_ref: report.receipt_ref.to_string(),
                receipt_digest: report.receipt_digest.to_string(),
                issued_org: org.to_string(),
                issued_member: report.member_id.to_string(),
                purchase_by: report.purchaser_id.to_string(),
                reward_pts_elig: report.eligible_points,
                reward_pts_trans: if settles {
                    report.eligible_points
                } else {
                    Points::ZERO
                },
                purchase_date: scope.today(),
                transfer_id,
            };

            scope.put_record(key, &purchase)?;
            scope.emit(LoyaltyEvent::PurchaseRecorded {
                purchase_id: purchase.purchase_id.clone(),
                reward_pts_elig: purchase.reward_pts_elig,
                purchase_date: purchase.purchase_date,
                issued_member: purchase.issued_member.clone(),
                transfer_id: purchase.transfer_id.clone(),
            });

            info!(
                purchase_id = %purchase.purchase_id,
                org = %purchase.issued_org,
                transfer_id = ?purchase.transfer_id,
                "Purchase recorded"
            );
            Ok(purchase.purchase_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::error::ErrorKind;
    use loyalty_acl::{AclTriple, PolicyDocument};
    use loyalty_core::{receipt_digest, RequestKind, Transfer};
    use loyalty_state::MemoryStore;

    fn caller(unique_id: &str) -> CallerAttributes {
        CallerAttributes::application("HILTON", "Bangalore", "ADMIN", unique_id)
    }

    fn setup(grant_quick_transfer: bool) -> LoyaltyLedger<MemoryStore> {
        let mut ledger = LoyaltyLedger::open(MemoryStore::new(), LedgerConfig::default()).unwrap();
        let admin = AclTriple::new("HILTON", "Bangalore", "ADMIN");
        let mut policy = PolicyDocument::default()
            .grant("setMembershipIdentities", admin.clone())
            .grant("requestRewardPoints", admin.clone())
            .grant("updatePurchase", admin.clone());
        if grant_quick_transfer {
            policy = policy.grant("quickTransfer", admin);
        }
        ledger.initialize(&caller("x509::root"), &policy).unwrap();

        ledger
            .set_membership_identities(&caller("x509::cashier"), "STORE", "Front", "Desk", "")
            .unwrap();
        ledger
            .set_membership_identities(&caller("x509::guest"), "G1", "Guest", "One", "")
            .unwrap();

        let id = ledger
            .request_reward_points(&caller("x509::cashier"), Points::new(1000), "STORE")
            .unwrap();
        ledger
            .approve_request(&caller("x509::guest"), &id, "G1", RequestKind::IssueRequest)
            .unwrap();
        ledger
    }

    fn report<'r>(purchase_id: &'r str, digest: &'r str, points: u64) -> PurchaseReport<'r> {
        PurchaseReport {
            purchase_id,
            purchaser_id: "G1",
            receipt_ref: "receipts/1001.pdf",
            receipt_digest: digest,
            eligible_points: Points::new(points),
            member_id: "STORE",
        }
    }

    fn load_purchase(ledger: &mut LoyaltyLedger<MemoryStore>, purchase_id: &str) -> Purchase {
        ledger
            .execute(&caller("x509::root"), |scope| {
                scope.get_record(&keys::purchase_key("HILTON", purchase_id)?)
            })
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_purchase_without_points_has_no_transfer() {
        let mut ledger = setup(false);
        let digest = receipt_digest(b"receipt 1001");

        let id = ledger
            .update_purchase(&caller("x509::cashier"), report("P-1", &digest, 0))
            .unwrap();
        assert_eq!(id, "P-1");

        let purchase = load_purchase(&mut ledger, "P-1");
        assert_eq!(purchase.transfer_id, None);
        assert_eq!(purchase.issued_org, "HILTON");
        assert_eq!(purchase.receipt_digest, digest);
    }

    #[test]
    fn test_purchase_settles_points() {
        let mut ledger = setup(true);
        let digest = receipt_digest(b"receipt 1002");

        ledger
            .update_purchase(&caller("x509::cashier"), report("P-2", &digest, 150))
            .unwrap();

        let purchase = load_purchase(&mut ledger, "P-2");
        let transfer_id = purchase.transfer_id.clone().unwrap();
        let transfer: Transfer = ledger
            .execute(&caller("x509::root"), |scope| {
                scope.get_record(&keys::transfer_key(&transfer_id)?)
            })
            .unwrap()
            .unwrap();

        assert_eq!(transfer.from, "STORE");
        assert_eq!(transfer.to, "G1");
        assert_eq!(transfer.value, Points::new(150));
        assert_eq!(transfer.remarks, SETTLEMENT_REMARK);

        let guest = ledger
            .execute(&caller("x509::root"), |scope| scope.load_member("G1"))
            .unwrap();
        assert_eq!(guest.reward_points, Points::new(150));
    }

    #[test]
    fn test_failed_settlement_stores_nothing() {
        let mut ledger = setup(true);

        let err = ledger
            .update_purchase(&caller("x509::cashier"), report("P-3", "abc", 5000))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);

        let stored: Option<Purchase> = ledger
            .execute(&caller("x509::root"), |scope| {
                scope.get_record(&keys::purchase_key("HILTON", "P-3")?)
            })
            .unwrap();
        assert!(stored.is_none());
    }

    #[test]
    fn test_settlement_requires_quick_transfer_grant() {
        let mut ledger = setup(false);

        let err = ledger
            .update_purchase(&caller("x509::cashier"), report("P-4", "abc", 10))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_duplicate_and_unknown_purchaser() {
        let mut ledger = setup(false);
        ledger
            .update_purchase(&caller("x509::cashier"), report("P-5", "abc", 0))
            .unwrap();

        let duplicate = ledger
            .update_purchase(&caller("x509::cashier"), report("P-5", "def", 0))
            .unwrap_err();
        assert_eq!(duplicate.kind(), ErrorKind::AlreadyExists);

        let mut unknown = report("P-6", "abc", 0);
        unknown.purchaser_id = "NOBODY";
        let err = ledger
            .update_purchase(&caller("x509::cashier"), unknown)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_authorizer_must_own_member() {
        let mut ledger = setup(false);
        let err = ledger
            .update_purchase(&caller("x509::guest"), report("P-7", "abc", 0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_purchase_by_authorizing_member_settles_in_place() {
        let mut ledger = setup(true);

        let mut own = report("P-8", "abc", 40);
        own.purchaser_id = "STORE";
        ledger.update_purchase(&caller("x509::cashier"), own).unwrap();

        let purchase = load_purchase(&mut ledger, "P-8");
        assert_eq!(purchase.transfer_id, None);
        assert_eq!(purchase.reward_pts_elig, Points::new(40));
        assert_eq!(purchase.reward_pts_trans, Points::ZERO);

        let store = ledger
            .execute(&caller("x509::root"), |scope| scope.load_member("STORE"))
            .unwrap();
        assert_eq!(store.reward_points, Points::new(1000));
        assert_eq!(
            ledger
                .request_reward_points(&caller("x509::cashier"), Points::new(1), "STORE")
                .unwrap(),
            "REQUEST_2"
        );
    }
}
