//! The loyalty ledger handle

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::keys;
use crate::scope::TxScope;
use chrono::{DateTime, Utc};
use loyalty_acl::{AccessControlTable, PolicyDocument};
use loyalty_core::{CallerAttributes, Function};
use loyalty_events::{EventEnvelope, EventSink, LoyaltyEvent, NullSink};
use loyalty_state::StateStore;
use tracing::{debug, error, info, warn};

/// Loyalty ledger over a world state store.
///
/// Holds the loaded access-control table; operations take `&mut self`, so a
/// ledger instance applies one operation at a time.
pub struct LoyaltyLedger<S: StateStore> {
    store: S,
    acl: AccessControlTable,
    config: LedgerConfig,
    sink: Box<dyn EventSink>,
}

impl<S: StateStore> LoyaltyLedger<S> {
    /// Open a ledger, loading the ACL persisted by an earlier initialization
    pub fn open(store: S, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;

        let acl = match store.get(keys::ACCESS_CONTROL_LIST)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => AccessControlTable::new(),
        };
        debug!(functions = acl.len(), "Loaded access control table");

        Ok(Self {
            store,
            acl,
            config,
            sink: Box::new(NullSink),
        })
    }

    /// Replace the event sink
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn acl(&self) -> &AccessControlTable {
        &self.acl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the supply counter has been written
    pub fn is_initialized(&self) -> LedgerResult<bool> {
        Ok(self.store.get(keys::TOTAL_REWARD_POINTS)?.is_some())
    }

    /// Bootstrap the program: write supply and sequence counters on first
    /// run, then store the access-control table.
    ///
    /// The first run only requires an application-class credential. Once
    /// initialized, replacing the table requires the `init` grant of the
    /// current table; counters are kept.
    pub fn initialize(
        &mut self,
        caller: &CallerAttributes,
        policy: &PolicyDocument,
    ) -> LedgerResult<()> {
        policy.validate()?;
        let table = AccessControlTable::from_policy(policy);
        let initial_supply = self.config.initial_supply;

        self.execute(caller, |scope| {
            let supply = if scope.exists(keys::TOTAL_REWARD_POINTS)? {
                scope.authorize(Function::Initialize)?;
                info!("Ledger already initialized, replacing access control table only");
                scope.supply()?
            } else {
                scope.require_credential(Function::Initialize)?;
                scope.set_supply(initial_supply);
                scope.write_counter(keys::REQUEST_NO, 0);
                initial_supply
            };

            scope.put_record(keys::ACCESS_CONTROL_LIST.to_string(), &table)?;
            scope.emit(LoyaltyEvent::ProgramInitialized {
                total_reward_points: supply,
                acl_functions: table.len(),
            });
            Ok(())
        })?;

        info!(functions = table.len(), "Access control table set");
        self.acl = table;
        Ok(())
    }

    /// Run one operation as a single transaction.
    ///
    /// Writes are committed only if `op` succeeds; on error nothing is
    /// written and no event is published. If another writer changed
    /// anything `op` read, the commit fails with a retryable store error.
    pub(crate) fn execute<T>(
        &mut self,
        caller: &CallerAttributes,
        op: impl FnOnce(&mut TxScope<'_, S>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let now = Utc::now();

        let (value, batch, events) = {
            let mut scope = TxScope::new(
                &self.store,
                caller,
                &self.acl,
                &self.config,
                now.date_naive(),
            );
            let value = op(&mut scope)?;
            let (batch, events) = scope.finish();
            (value, batch, events)
        };

        if !batch.is_empty() {
            let writes = batch.len();
            self.store.commit(batch).map_err(|e| {
                if e.is_conflict() {
                    warn!(error = %e, "Transaction lost a write race");
                } else {
                    error!(error = %e, "Failed to commit world state");
                }
                LedgerError::from(e)
            })?;
            debug!(writes, "Committed transaction");
        }

        self.publish(&caller.unique_id, now, events);
        Ok(value)
    }

    /// Deliver events; sink failures are logged and never undo the commit
    fn publish(&mut self, submitter: &str, timestamp: DateTime<Utc>, events: Vec<LoyaltyEvent>) {
        for event in events {
            let envelope = EventEnvelope::new(event, submitter, timestamp);
            if let Err(e) = self.sink.emit(&envelope) {
                warn!(event = envelope.name(), error = %e, "Failed to publish event");
            }
        }
    }
}
