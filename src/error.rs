//! Error types for loghub

use thiserror::Error;

/// Errors that can occur in the log aggregation core
///
/// Normal log intake never fails — invalid levels, missing fields, and
/// unparsable timestamps are silently defaulted. Errors are limited to
/// configuration and wire (de)serialization problems.
#[derive(Debug, Error)]
pub enum LogError {
    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for loghub operations
pub type Result<T> = std::result::Result<T, LogError>;
