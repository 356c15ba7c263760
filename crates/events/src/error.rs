//! Event log errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Event log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{file}:{line}: not a valid event: {source}")]
    InvalidLine {
        file: String,
        line: usize,
        source: serde_json::Error,
    },
}
