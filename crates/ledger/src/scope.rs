//! Per-operation transaction scope
//!
//! A `TxScope` carries everything one ledger operation may touch: a buffered
//! view of the world state, the caller, the access-control table, the config
//! and the events to publish once the writes commit.

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::keys::{self, Namespace};
use loyalty_acl::{check_credential, AccessControlTable, AccessDecision, DenialReason};
use loyalty_core::{CallerAttributes, Function, Member, Points};
use loyalty_events::LoyaltyEvent;
use loyalty_state::{StateError, StateStore, Transaction, WriteBatch};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Buffered view of the world state for a single operation
pub(crate) struct TxScope<'a, S: StateStore + ?Sized> {
    tx: Transaction<'a, S>,
    caller: &'a CallerAttributes,
    acl: &'a AccessControlTable,
    config: &'a LedgerConfig,
    today: NaiveDate,
    events: Vec<LoyaltyEvent>,
}

impl<'a, S: StateStore + ?Sized> TxScope<'a, S> {
    pub(crate) fn new(
        store: &'a S,
        caller: &'a CallerAttributes,
        acl: &'a AccessControlTable,
        config: &'a LedgerConfig,
        today: NaiveDate,
    ) -> Self {
        Self {
            tx: Transaction::begin(store),
            caller,
            acl,
            config,
            today,
            events: Vec::new(),
        }
    }

    pub(crate) fn caller(&self) -> &'a CallerAttributes {
        self.caller
    }

    pub(crate) fn acl(&self) -> &'a AccessControlTable {
        self.acl
    }

    pub(crate) fn config(&self) -> &'a LedgerConfig {
        self.config
    }

    /// Transaction date, used for every date field written
    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }

    /// Check the caller against the ACL entry of `function`.
    ///
    /// A credential without its Org, Dept and Role attributes is malformed
    /// input rather than a refusal, so it is reported as `InvalidArgument`.
    pub(crate) fn authorize(&self, function: Function) -> LedgerResult<()> {
        let entry = function.acl_entry();
        match self.acl.authorize(
            self.caller,
            entry,
            &self.config.application_certificate_type,
        ) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied(reason) => Err(self.denied(function, reason)),
        }
    }

    /// Require an application-class credential with complete attributes,
    /// without consulting the table
    pub(crate) fn require_credential(&self, function: Function) -> LedgerResult<()> {
        check_credential(self.caller, &self.config.application_certificate_type)
            .map(|_| ())
            .map_err(|reason| self.denied(function, reason))
    }

    fn denied(&self, function: Function, reason: DenialReason) -> LedgerError {
        warn!(
            function = %function,
            caller = %self.caller.unique_id,
            reason = %reason,
            "Access denied"
        );
        match reason {
            DenialReason::MissingAttributes => LedgerError::InvalidArgument(reason.to_string()),
            other => LedgerError::PermissionDenied(other.to_string()),
        }
    }

    /// Require that `member_id` is bound to the caller's credential.
    ///
    /// An unknown member fails the check the same way a foreign one does.
    pub(crate) fn require_owner(&self, member_id: &str) -> LedgerResult<Member> {
        let owned = self
            .find_member(member_id)?
            .filter(|member| member.is_owned_by(&self.caller.unique_id));

        owned.ok_or_else(|| {
            warn!(member_id, caller = %self.caller.unique_id, "Member not bound to caller");
            LedgerError::PermissionDenied(format!(
                "member {} is not bound to the calling identity",
                member_id
            ))
        })
    }

    /// The caller's organization attribute
    pub(crate) fn caller_org(&self) -> LedgerResult<&'a str> {
        self.caller
            .organization
            .as_deref()
            .filter(|org| !org.is_empty())
            .ok_or_else(|| {
                LedgerError::InvalidArgument("caller credential has no Org attribute".to_string())
            })
    }

    // === Typed records ===

    pub(crate) fn get_record<T: DeserializeOwned>(&self, key: &str) -> LedgerResult<Option<T>> {
        match self.tx.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn put_record<T: Serialize>(&mut self, key: String, record: &T) -> LedgerResult<()> {
        let bytes = serde_json::to_vec(record)?;
        self.tx.put(key, bytes);
        Ok(())
    }

    /// Whether a key holds a value
    pub(crate) fn exists(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.tx.exists(key)?)
    }

    /// Every record of a namespace, in key order
    pub(crate) fn scan_records<T: DeserializeOwned>(&self, namespace: Namespace) -> LedgerResult<Vec<T>> {
        let prefix = keys::namespace_prefix(namespace)?;
        let mut records = Vec::new();
        for entry in self.tx.scan_prefix(&prefix)? {
            let (_, bytes) = entry?;
            records.push(serde_json::from_slice(&bytes)?);
        }
        Ok(records)
    }

    // === Members ===

    pub(crate) fn find_member(&self, member_id: &str) -> LedgerResult<Option<Member>> {
        self.get_record(&keys::member_key(member_id)?)
    }

    pub(crate) fn load_member(&self, member_id: &str) -> LedgerResult<Member> {
        self.find_member(member_id)?
            .ok_or_else(|| LedgerError::NotFound(format!("member {}", member_id)))
    }

    /// Absence is an answer here, not an error
    pub(crate) fn member_exists(&self, member_id: &str) -> LedgerResult<bool> {
        self.exists(&keys::member_key(member_id)?)
    }

    pub(crate) fn save_member(&mut self, member: &Member) -> LedgerResult<()> {
        let key = keys::member_key(&member.member_id)?;
        self.put_record(key, member)
    }

    // === Counters ===

    /// Allocate the next value of the shared request/transfer sequence
    pub(crate) fn next_sequence(&mut self) -> LedgerResult<u64> {
        let current = self.read_counter(keys::REQUEST_NO)?;
        let next = current.checked_add(1).ok_or_else(|| {
            LedgerError::Store(StateError::Corrupt("REQUEST_NO overflow".to_string()))
        })?;
        self.write_counter(keys::REQUEST_NO, next);
        Ok(next)
    }

    /// Remaining supply
    pub(crate) fn supply(&self) -> LedgerResult<Points> {
        Ok(Points::new(self.read_counter(keys::TOTAL_REWARD_POINTS)?))
    }

    pub(crate) fn set_supply(&mut self, supply: Points) {
        self.write_counter(keys::TOTAL_REWARD_POINTS, supply.value());
    }

    pub(crate) fn read_counter(&self, key: &str) -> LedgerResult<u64> {
        let bytes = self.tx.get(key)?.ok_or_else(|| {
            LedgerError::NotFound(format!("{} (ledger is not initialized)", key))
        })?;
        let text = String::from_utf8_lossy(&bytes);
        text.trim().parse::<u64>().map_err(|_| {
            LedgerError::Store(StateError::Corrupt(format!("{} holds {:?}", key, text)))
        })
    }

    pub(crate) fn write_counter(&mut self, key: &str, value: u64) {
        self.tx.put(key, value.to_string().into_bytes());
    }

    // === Events ===

    /// Queue an event for publication after commit
    pub(crate) fn emit(&mut self, event: LoyaltyEvent) {
        self.events.push(event);
    }

    /// Close the scope, yielding the writes to commit and the events to publish
    pub(crate) fn finish(self) -> (WriteBatch, Vec<LoyaltyEvent>) {
        (self.tx.into_batch(), self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loyalty_acl::{AclTriple, PolicyDocument};
    use loyalty_state::MemoryStore;

    fn member(id: &str, key: &str) -> Member {
        Member {
            member_id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "Member".to_string(),
            phone: String::new(),
            org: "HILTON".to_string(),
            dept: "Bangalore".to_string(),
            role: "ADMIN".to_string(),
            public_key: key.to_string(),
            msp_id: String::new(),
            reward_points: Points::ZERO,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_sequence_is_buffered_until_commit() {
        let mut store = MemoryStore::new();
        store.put(keys::REQUEST_NO, b"0".to_vec()).unwrap();

        let caller = CallerAttributes::application("HILTON", "Bangalore", "ADMIN", "x509::a");
        let acl = AccessControlTable::new();
        let config = LedgerConfig::default();

        let batch = {
            let mut scope = TxScope::new(&store, &caller, &acl, &config, today());
            assert_eq!(scope.next_sequence().unwrap(), 1);
            assert_eq!(scope.next_sequence().unwrap(), 2);
            scope.finish().0
        };

        assert_eq!(store.get(keys::REQUEST_NO).unwrap(), Some(b"0".to_vec()));
        store.commit(batch).unwrap();
        assert_eq!(store.get(keys::REQUEST_NO).unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_uninitialized_counter() {
        let store = MemoryStore::new();
        let caller = CallerAttributes::default();
        let acl = AccessControlTable::new();
        let config = LedgerConfig::default();
        let scope = TxScope::new(&store, &caller, &acl, &config, today());

        assert!(matches!(scope.supply(), Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn test_require_owner() {
        let store = MemoryStore::new();
        let caller = CallerAttributes::application("HILTON", "Bangalore", "ADMIN", "x509::a");
        let acl = AccessControlTable::new();
        let config = LedgerConfig::default();
        let mut scope = TxScope::new(&store, &caller, &acl, &config, today());

        scope.save_member(&member("M1", "x509::a")).unwrap();
        scope.save_member(&member("M2", "x509::b")).unwrap();

        assert_eq!(scope.require_owner("M1").unwrap().member_id, "M1");
        assert!(matches!(
            scope.require_owner("M2"),
            Err(LedgerError::PermissionDenied(_))
        ));
        assert!(matches!(
            scope.require_owner("M404"),
            Err(LedgerError::PermissionDenied(_))
        ));
        assert!(scope.member_exists("M2").unwrap());
        assert!(!scope.member_exists("M404").unwrap());
    }

    #[test]
    fn test_authorize_uses_acl_entry() {
        let store = MemoryStore::new();
        let caller = CallerAttributes::application("HILTON", "Bangalore", "ADMIN", "x509::a");
        let acl = AccessControlTable::from_policy(
            &PolicyDocument::default()
                .grant("requestRewardPoints", AclTriple::new("HILTON", "Bangalore", "ADMIN")),
        );
        let config = LedgerConfig::default();
        let scope = TxScope::new(&store, &caller, &acl, &config, today());

        assert!(scope.authorize(Function::RequestRewardPoints).is_ok());
        assert!(scope.authorize(Function::ApproveRequest).is_ok());
        assert!(matches!(
            scope.authorize(Function::BurnRewardPoints),
            Err(LedgerError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_missing_attributes_are_invalid_arguments() {
        let store = MemoryStore::new();
        let mut caller = CallerAttributes::application("HILTON", "Bangalore", "ADMIN", "x509::a");
        caller.department = None;
        let acl = AccessControlTable::from_policy(
            &PolicyDocument::default()
                .grant("requestRewardPoints", AclTriple::new("HILTON", "Bangalore", "ADMIN")),
        );
        let config = LedgerConfig::default();
        let scope = TxScope::new(&store, &caller, &acl, &config, today());

        assert!(matches!(
            scope.authorize(Function::RequestRewardPoints),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(matches!(
            scope.require_credential(Function::Initialize),
            Err(LedgerError::InvalidArgument(_))
        ));

        let peer = CallerAttributes::application("HILTON", "Bangalore", "ADMIN", "x509::p")
            .with_certificate_type("peer");
        let scope = TxScope::new(&store, &peer, &acl, &config, today());
        assert!(matches!(
            scope.require_credential(Function::Initialize),
            Err(LedgerError::PermissionDenied(_))
        ));
    }
}
