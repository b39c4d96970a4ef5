//! Store configuration

use crate::error::{LogError, Result};
use serde::Deserialize;

/// Default retention capacity
pub const DEFAULT_MAX_LOGS: usize = 10_000;

/// Default per-subscriber delivery buffer (messages)
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Configuration for a [`LogStore`](crate::LogStore)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of entries retained; the oldest entry is evicted
    /// once an insertion pushes the store past this bound
    pub max_logs: usize,

    /// Per-subscriber channel capacity. A subscriber whose buffer fills
    /// is dropped rather than allowed to block producers.
    pub subscriber_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_logs: DEFAULT_MAX_LOGS,
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from a JSON string, e.g. loaded from a file
    /// by the embedding service
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|e| LogError::Config(format!("Invalid store config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.max_logs == 0 {
            return Err(LogError::Config(
                "max_logs must be at least 1".to_string(),
            ));
        }
        if self.subscriber_buffer == 0 {
            return Err(LogError::Config(
                "subscriber_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
