//! Relay pool configuration
//!
//! Defines how many tunnel connections carry one UDP association.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of tunnel connections per association
fn default_fanout() -> usize {
    1
}

/// Default supervision poll interval in milliseconds
fn default_poll_interval_ms() -> u64 {
    1000
}

/// Relay pool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoolConfig {
    /// Parallel tunnel connections per UDP association
    #[serde(default = "default_fanout")]
    pub fanout: usize,

    /// How often the pool checks whether every member has closed
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            fanout: default_fanout(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with `fanout` members and the default interval
    pub fn with_fanout(fanout: usize) -> Self {
        PoolConfig {
            fanout,
            ..Default::default()
        }
    }

    /// Supervision poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate the pool configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fanout == 0 {
            return Err("fanout must be greater than 0".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}
