//! Live stream configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Automatic reconnects allowed after an abnormal closure
    pub reconnect_attempts: u32,
    /// Delay before a reconnect attempt
    pub reconnect_interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_attempts: 1,
            reconnect_interval_ms: 5000,
        }
    }
}

impl StreamConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_partial_toml() {
        let config: StreamConfig = toml::from_str("reconnect_attempts = 3").unwrap();
        assert_eq!(config.reconnect_attempts, 3);
        assert_eq!(config.reconnect_interval(), Duration::from_secs(5));
    }
}
