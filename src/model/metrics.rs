//! Aggregate payloads returned by the statistics endpoints.

use serde::{Deserialize, Serialize};

/// Service-level indicators for the current period and the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SliSnapshot {
    /// Average response time in milliseconds
    pub average_latency: f64,
    /// Fraction of failed requests in [0, 1]
    pub error_rate: f64,
    /// Requests per second
    pub throughput: f64,
    pub prev_average_latency: f64,
    pub prev_error_rate: f64,
    pub prev_throughput: f64,
}

/// One bucket of the `/requests-stats` failure-rate series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRatePoint {
    pub date: String,
    pub failure_rate: f64,
    pub total_requests: usize,
}

/// Request count per endpoint and status from `/requests-by-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub request_count: u64,
    pub status: String,
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sli_snapshot_camel_case() {
        let json = r#"{
            "averageLatency": 120.5,
            "errorRate": 0.02,
            "throughput": 3.5,
            "prevAverageLatency": 100.0,
            "prevErrorRate": 0.04,
            "prevThroughput": 2.0
        }"#;
        let sli: SliSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(sli.average_latency, 120.5);
        assert_eq!(sli.prev_error_rate, 0.04);
    }

    #[test]
    fn test_sli_snapshot_missing_fields_default_to_zero() {
        let sli: SliSnapshot = serde_json::from_str(r#"{"throughput": 1.0}"#).unwrap();
        assert_eq!(sli.throughput, 1.0);
        assert_eq!(sli.prev_throughput, 0.0);
    }

    #[test]
    fn test_failure_rate_point_parses() {
        let json = r#"[{"date": "01-01-2024 10:00:00.000", "failureRate": 0.25, "totalRequests": 8}]"#;
        let points: Vec<FailureRatePoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points[0].total_requests, 8);
    }
}
