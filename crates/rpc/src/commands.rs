//! CLI commands

use crate::context::AppContext;
use crate::dispatch::Response;
use crate::error::{RpcError, RpcResult};
use loyalty_acl::PolicyDocument;
use loyalty_core::{receipt_digest, CallerAttributes};
use loyalty_events::EventEnvelope;
use loyalty_ledger::LedgerError;
use std::path::Path;

/// Read the caller's attested attributes from a JSON file
pub fn load_caller(path: &Path) -> RpcResult<CallerAttributes> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| RpcError::Json {
        file: path.display().to_string(),
        source,
    })
}

/// Initialize the program with the policy document at `policy_path`
pub fn init(ctx: &mut AppContext, caller: &CallerAttributes, policy_path: &Path) -> RpcResult<Response> {
    let content = std::fs::read_to_string(policy_path)?;
    let response = match PolicyDocument::from_json(&content) {
        Ok(policy) => ctx.initialize(caller, &policy),
        Err(e) => Response::error(&LedgerError::from(e)),
    };
    Ok(response)
}

/// Invoke a function by name with positional arguments
pub fn invoke(
    ctx: &mut AppContext,
    caller: &CallerAttributes,
    function: &str,
    args: &[String],
) -> Response {
    ctx.invoke(caller, function, args)
}

/// Published events, optionally restricted to one event name
pub fn events(ctx: &AppContext, name: Option<&str>) -> RpcResult<Vec<EventEnvelope>> {
    ctx.events(name)
}

/// SHA-256 digest of a receipt file, as stored on purchases
pub fn digest(path: &Path) -> RpcResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(receipt_digest(&bytes))
}
