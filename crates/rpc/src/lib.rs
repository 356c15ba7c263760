//! Loyalty RPC - Caller surface and CLI orchestrator
//!
//! Function names and positional arguments are parsed into a typed
//! `Operation`, dispatched against the ledger, and answered with a JSON
//! `Response` envelope.

pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod operation;

pub use config::AppConfig;
pub use context::AppContext;
pub use dispatch::{dispatch, Response, ResponseStatus};
pub use error::{RpcError, RpcResult};
pub use operation::Operation;
