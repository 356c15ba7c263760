//! Application configuration

use crate::error::{RpcError, RpcResult};
use loyalty_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Holds `state.db` and the `events/` log directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> RpcResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| RpcError::Json {
            file: path.display().to_string(),
            source,
        })
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.db")
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("events")
    }
}
