//! Backend connection configuration

use serde::{Deserialize, Serialize};

/// Where the observability backend lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// REST base URL, e.g. `https://logs.example.com`
    pub base_url: String,
    /// Explicit streaming URL; derived from `base_url` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_url: Option<String>,
    /// Bearer token sent as `X-API-Key` and as the first stream frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            ws_url: None,
            token: None,
            timeout_seconds: 10,
        }
    }
}

impl ApiConfig {
    /// Streaming endpoint: the configured `ws_url`, or the base URL with its
    /// scheme switched to `ws`/`wss` and `/requests-ws` appended.
    pub fn stream_url(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/requests-ws", base)
    }
}
