//! Configuration module for reqwatch
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`REQWATCH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use reqwatch::config::ReqwatchConfig;
//!
//! let config = ReqwatchConfig::default();
//! assert_eq!(config.query.refresh_interval_seconds, 120);
//!
//! let toml = r#"
//! [api]
//! base_url = "https://logs.example.com"
//! "#;
//! let config: ReqwatchConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.api.base_url, "https://logs.example.com");
//! assert_eq!(config.api.stream_url(), "wss://logs.example.com/requests-ws");
//! ```

pub mod api;
pub mod error;
pub mod logging;
pub mod query;
pub mod stream;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use query::QueryConfig;
pub use stream::StreamConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the reqwatch engine and console.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReqwatchConfig {
    /// Backend endpoints and credentials
    pub api: ApiConfig,
    /// Historical query behaviour
    pub query: QueryConfig,
    /// Live stream reconnection policy
    pub stream: StreamConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ReqwatchConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("REQWATCH_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(url) = std::env::var("REQWATCH_WS_URL") {
            self.api.ws_url = Some(url);
        }
        if let Ok(token) = std::env::var("REQWATCH_TOKEN") {
            self.api.token = Some(token);
        }

        if let Ok(level) = std::env::var("REQWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("REQWATCH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.is_empty() {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: "URL must start with http:// or https://".to_string(),
            });
        }
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "api.timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }
        if self.query.refresh_interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "query.refresh_interval_seconds".to_string(),
                message: "refresh interval must be non-zero".to_string(),
            });
        }
        if !crate::filter::PAGE_SIZES.contains(&self.query.default_page_size) {
            return Err(ConfigError::Validation {
                field: "query.default_page_size".to_string(),
                message: format!("page size must be one of {:?}", crate::filter::PAGE_SIZES),
            });
        }

        Ok(())
    }
}
