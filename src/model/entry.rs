//! Request log entries and the historical page envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One logged HTTP request as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the request was received
    pub date: DateTime<Utc>,
    pub method: String,
    pub endpoint: String,
    /// Raw query string
    #[serde(default)]
    pub params: String,
    pub status: u16,
    /// Raw request header block
    #[serde(default)]
    pub req_headers: String,
    /// Raw response header block
    #[serde(default)]
    pub res_headers: String,
    #[serde(default)]
    pub req_body: Option<serde_json::Value>,
    #[serde(default)]
    pub res_body: Option<serde_json::Value>,
    /// Response time in milliseconds
    pub res_time: u32,
}

impl LogEntry {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_status(self.status)
    }
}

/// A page of historical entries plus the total matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    #[serde(rename = "requests", default)]
    pub entries: Vec<LogEntry>,
    #[serde(default)]
    pub total_items: usize,
}

impl LogPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// HTTP method filter. `All` disables method filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    All,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const VARIANTS: [HttpMethod; 8] = [
        HttpMethod::All,
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::All => "ALL",
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, HttpMethod::All)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::VARIANTS
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid HTTP method: {}", s))
    }
}

/// Coarse classification of a response status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500..=u16::MAX => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }
}
