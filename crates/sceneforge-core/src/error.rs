//! Engine error types.

use thiserror::Error;

/// Errors surfaced across the command boundary.
///
/// Expected UI races (stale ids, unknown kinds, out-of-range zoom) never produce
/// an error; only caller contract violations and bad configuration do.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Index {index} out of range for {len} objects")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
