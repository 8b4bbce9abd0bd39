//! Uptime samples, derived roll-ups and monitored endpoint settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which uptime aggregation `/uptime` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UptimeType {
    Total,
    PerHour,
}

impl UptimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UptimeType::Total => "TOTAL",
            UptimeType::PerHour => "PER_HOUR",
        }
    }
}

/// Uptime percentage for one URL, optionally bucketed by hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UptimeSample {
    pub url: String,
    /// Percentage in [0, 100]
    pub uptime: f64,
    /// Hour bucket formatted as `YYYY-MM-DD HH:00:00`; absent for totals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
}

/// Average uptime of one URL over one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UptimeRollup {
    pub url: String,
    /// `YYYY-MM-DD`
    pub day: String,
    pub average_uptime: f64,
}

/// HTTP method used by the backend's uptime pinger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum MonitorMethod {
    GET,
    POST,
    PUT,
    DELETE,
}

impl fmt::Display for MonitorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonitorMethod::GET => "GET",
            MonitorMethod::POST => "POST",
            MonitorMethod::PUT => "PUT",
            MonitorMethod::DELETE => "DELETE",
        };
        f.write_str(s)
    }
}

impl FromStr for MonitorMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(MonitorMethod::GET),
            "POST" => Ok(MonitorMethod::POST),
            "PUT" => Ok(MonitorMethod::PUT),
            "DELETE" => Ok(MonitorMethod::DELETE),
            _ => Err(format!("'{}' is not a valid HTTP method", s)),
        }
    }
}

/// A monitored endpoint as managed through `/uptime-settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeSetting {
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<MonitorMethod>,
    /// Ping interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_sample_with_and_without_hour() {
        let json = r#"[
            {"url": "https://a.example", "uptime": 99.5},
            {"url": "https://a.example", "uptime": 100.0, "hour": "2024-01-01 10:00:00"}
        ]"#;
        let samples: Vec<UptimeSample> = serde_json::from_str(json).unwrap();
        assert!(samples[0].hour.is_none());
        assert_eq!(samples[1].hour.as_deref(), Some("2024-01-01 10:00:00"));
    }

    #[test]
    fn test_uptime_type_wire_names() {
        assert_eq!(UptimeType::PerHour.as_str(), "PER_HOUR");
        assert_eq!(
            serde_json::to_string(&UptimeType::Total).unwrap(),
            "\"TOTAL\""
        );
    }

    #[test]
    fn test_uptime_setting_serializes_without_empty_fields() {
        let setting = UptimeSetting {
            url: "https://a.example/health".to_string(),
            name: "api".to_string(),
            method: Some(MonitorMethod::GET),
            interval: Some(60),
            enabled: None,
        };
        let value = serde_json::to_value(&setting).unwrap();
        assert_eq!(value["method"], "GET");
        assert!(value.get("enabled").is_none());
    }
}
