//! Watcher configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait window between poll cycles
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Seconds between poll cycles (default: 30, valid: 1-3600)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Check values are within their supported ranges
    pub fn validate(&self) -> Result<()> {
        if !(1..=3600).contains(&self.poll_interval_secs) {
            anyhow::bail!(
                "poll_interval_secs must be between 1 and 3600 (got {})",
                self.poll_interval_secs
            );
        }
        Ok(())
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
