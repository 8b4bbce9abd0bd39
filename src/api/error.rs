//! Error types for backend API calls.

use thiserror::Error;

/// Errors that can occur while talking to the REST API.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// Backend returned an error response (4xx, 5xx).
    #[error("Backend error {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body doesn't match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// HTTP client could not be constructed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Classify a reqwest error.
    pub fn from_reqwest(e: reqwest::Error, timeout_seconds: u64) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(timeout_seconds)
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 | 403, .. })
    }
}
