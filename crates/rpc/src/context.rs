//! Application context - wires the ledger to durable storage

use crate::config::AppConfig;
use crate::dispatch::{dispatch, Response};
use crate::error::RpcResult;
use crate::operation::Operation;
use loyalty_acl::PolicyDocument;
use loyalty_core::CallerAttributes;
use loyalty_events::{EventEnvelope, EventReader, JsonlEventStore};
use loyalty_ledger::LoyaltyLedger;
use loyalty_state::SqliteStore;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Ledger over SQLite world state, publishing to the JSONL event log
pub struct AppContext {
    pub ledger: LoyaltyLedger<SqliteStore>,
    events_path: PathBuf,
}

impl AppContext {
    pub fn new(config: &AppConfig) -> RpcResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let events_path = config.events_path();

        let store = SqliteStore::open(config.state_path())?;
        let sink = JsonlEventStore::new(&events_path)?;
        let ledger = LoyaltyLedger::open(store, config.ledger.clone())?.with_sink(sink);

        info!(data_dir = %config.data_dir.display(), "Opened loyalty ledger");
        Ok(Self {
            ledger,
            events_path,
        })
    }

    /// Install `policy` as the access-control table.
    ///
    /// Bootstrap runs only here, never through `invoke`.
    pub fn initialize(&mut self, caller: &CallerAttributes, policy: &PolicyDocument) -> Response {
        self.ledger
            .initialize(caller, policy)
            .map(|()| json!({ "functions": self.ledger.acl().len() }))
            .into()
    }

    /// Parse and run one call, always producing a response envelope
    pub fn invoke(&mut self, caller: &CallerAttributes, function: &str, args: &[String]) -> Response {
        Operation::parse(function, args)
            .and_then(|op| dispatch(&mut self.ledger, caller, op))
            .into()
    }

    /// Events published so far, oldest first, optionally only those named `name`
    pub fn events(&self, name: Option<&str>) -> RpcResult<Vec<EventEnvelope>> {
        let reader = EventReader::from_directory(&self.events_path)?;
        let events = match name {
            Some(name) => reader.read_named(name)?,
            None => reader.read_all()?,
        };
        Ok(events)
    }

    pub fn is_initialized(&self) -> RpcResult<bool> {
        Ok(self.ledger.is_initialized()?)
    }
}
