//! RPC errors

use loyalty_events::EventError;
use loyalty_ledger::LedgerError;
use loyalty_state::StateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("State store error: {0}")]
    State(#[from] StateError),

    #[error("Event log error: {0}")]
    Events(#[from] EventError),
}

pub type RpcResult<T> = Result<T, RpcError>;
