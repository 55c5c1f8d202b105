//! Error types for disk location reconciliation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The external tool binary is not installed or not on PATH
    #[error("command not found: {tool}")]
    ToolUnavailable { tool: String },

    /// The external tool ran but exited non-zero or produced unusable output
    #[error("{tool} failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither a controller tool nor the block device listing produced data
    #[error("no usable disk information source available")]
    NoUsableSource,
}
