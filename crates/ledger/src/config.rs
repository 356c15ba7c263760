//! Ledger configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! `LOYALTY_*` environment variables override file values.

use crate::error::{LedgerError, LedgerResult};
use loyalty_core::Points;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Supply minted into circulation when the program is initialized
pub const DEFAULT_INITIAL_SUPPLY: u64 = 100_000_000_000;

/// What happens when a burn request reaches its approval threshold
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BurnPolicy {
    /// Record the approval and mark the request ISSUED; balances are untouched
    #[default]
    RecordOnly,

    /// Deduct the quantity from the requester and return it to the supply
    Retire,
}

/// Configuration for the loyalty ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// TOTAL_REWARD_POINTS written on first initialization
    #[serde(default = "default_initial_supply")]
    pub initial_supply: Points,

    /// Distinct approvals needed before a request is issued
    #[serde(default = "default_required_approvals")]
    pub required_approvals: usize,

    /// Whether the requester may approve their own request
    #[serde(default = "default_allow_self_approval")]
    pub allow_self_approval: bool,

    #[serde(default)]
    pub burn_policy: BurnPolicy,

    /// Require the caller to own the `from` member of a direct transfer
    #[serde(default)]
    pub transfer_requires_owner: bool,

    /// Certificate type accepted by the access check
    #[serde(default = "default_application_certificate_type")]
    pub application_certificate_type: String,
}

fn default_initial_supply() -> Points {
    Points::new(DEFAULT_INITIAL_SUPPLY)
}

fn default_required_approvals() -> usize {
    1
}

fn default_allow_self_approval() -> bool {
    true
}

fn default_application_certificate_type() -> String {
    "app".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_supply: default_initial_supply(),
            required_approvals: default_required_approvals(),
            allow_self_approval: default_allow_self_approval(),
            burn_policy: BurnPolicy::default(),
            transfer_requires_owner: false,
            application_certificate_type: default_application_certificate_type(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Apply `LOYALTY_*` overrides from the process environment
    pub fn with_env_overrides(self) -> LedgerResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LedgerResult<Self> {
        if let Some(value) = lookup("LOYALTY_INITIAL_SUPPLY") {
            self.initial_supply = parse_var("LOYALTY_INITIAL_SUPPLY", &value)?;
        }
        if let Some(value) = lookup("LOYALTY_REQUIRED_APPROVALS") {
            self.required_approvals = parse_var("LOYALTY_REQUIRED_APPROVALS", &value)?;
        }
        if let Some(value) = lookup("LOYALTY_ALLOW_SELF_APPROVAL") {
            self.allow_self_approval = parse_var("LOYALTY_ALLOW_SELF_APPROVAL", &value)?;
        }
        if let Some(value) = lookup("LOYALTY_BURN_POLICY") {
            self.burn_policy = parse_var("LOYALTY_BURN_POLICY", &value)?;
        }
        if let Some(value) = lookup("LOYALTY_TRANSFER_REQUIRES_OWNER") {
            self.transfer_requires_owner = parse_var("LOYALTY_TRANSFER_REQUIRES_OWNER", &value)?;
        }
        if let Some(value) = lookup("LOYALTY_APP_CERTIFICATE_TYPE") {
            self.application_certificate_type = value;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the workflow cannot run with
    pub fn validate(&self) -> LedgerResult<()> {
        if self.required_approvals == 0 {
            return Err(LedgerError::InvalidArgument(
                "required_approvals must be at least 1".to_string(),
            ));
        }
        if self.application_certificate_type.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "application_certificate_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> LedgerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LedgerError::InvalidArgument(format!("{}={} is not valid", name, value)))
}
