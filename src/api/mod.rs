//! REST client for the observability backend.
//!
//! Every call carries the session token in the `X-API-Key` header. Responses
//! are decoded into the types in [`crate::model`].

pub mod error;
pub mod params;

pub use error::ApiError;
pub use params::{iso, RequestsParams};

use crate::config::ApiConfig;
use crate::model::{
    FailureRatePoint, LogPage, SliSnapshot, StatusCount, UptimeSample, UptimeSetting, UptimeType,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "X-API-Key";

/// Source of historical log pages.
///
/// Implemented by [`ApiClient`]; the query engine only depends on this seam.
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    async fn fetch_requests(&self, params: &RequestsParams) -> Result<LogPage, ApiError>;
}

/// Source of endpoint suggestions for the search box.
#[async_trait]
pub trait SuggestionSource: Send + Sync + 'static {
    async fn search_suggestions(&self, keyword: &str) -> Result<Vec<String>, ApiError>;
}

/// `{"msg": "..."}` acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub msg: String,
}

/// Typed client for the backend's REST endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout_seconds: u64,
}

impl ApiClient {
    /// Create a client with its own connection pool.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        Ok(Self::with_client(config, client))
    }

    /// Create a client around an existing reqwest client (for testing).
    pub fn with_client(config: &ApiConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.url(path)))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout_seconds))?;

        metrics::histogram!("reqwatch_api_latency_seconds", "endpoint" => endpoint)
            .record(start.elapsed().as_secs_f64());

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(endpoint, status = status.as_u16(), "API returned error status");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout_seconds))?;

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("{} response: {}", endpoint, e)))
    }

    /// `GET /requests`: one filtered page of log entries.
    pub async fn requests(&self, params: &RequestsParams) -> Result<LogPage, ApiError> {
        let builder = self.get("/requests").query(&params.query_pairs());
        self.send_json("requests", builder).await
    }

    /// `GET /requests-stats`: hourly failure-rate series since `from`.
    pub async fn requests_stats(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<FailureRatePoint>, ApiError> {
        let builder = self.get("/requests-stats").query(&[
            ("statType", "status".to_string()),
            ("from", iso(from)),
            ("granularity", "hourly".to_string()),
        ]);
        self.send_json("requests-stats", builder).await
    }

    /// `GET /requests-by-status`: counts per endpoint and status since `from`.
    pub async fn requests_by_status(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<StatusCount>, ApiError> {
        let builder = self
            .get("/requests-by-status")
            .query(&[("from", iso(from))]);
        self.send_json("requests-by-status", builder).await
    }

    /// `GET /requests/sli`: current and previous-period indicators.
    pub async fn sli(&self, from: DateTime<Utc>) -> Result<SliSnapshot, ApiError> {
        let builder = self.get("/requests/sli").query(&[("from", iso(from))]);
        self.send_json("sli", builder).await
    }

    /// `GET /uptime`: uptime samples of every monitored URL.
    pub async fn uptime(&self, uptime_type: UptimeType) -> Result<Vec<UptimeSample>, ApiError> {
        let builder = self
            .get("/uptime")
            .query(&[("uptimeType", uptime_type.as_str())]);
        self.send_json("uptime", builder).await
    }

    /// `GET /uptime-settings`
    pub async fn uptime_settings(&self) -> Result<Vec<UptimeSetting>, ApiError> {
        self.send_json("uptime-settings", self.get("/uptime-settings"))
            .await
    }

    /// `POST /uptime-settings`
    pub async fn add_uptime_setting(
        &self,
        setting: &UptimeSetting,
    ) -> Result<MessageResponse, ApiError> {
        let builder = self
            .authorized(self.client.post(self.url("/uptime-settings")))
            .json(setting);
        self.send_json("uptime-settings", builder).await
    }

    /// `DELETE /uptime-settings?url=`
    pub async fn remove_uptime_setting(&self, url: &str) -> Result<MessageResponse, ApiError> {
        let builder = self
            .authorized(self.client.delete(self.url("/uptime-settings")))
            .query(&[("url", url)]);
        self.send_json("uptime-settings", builder).await
    }

    /// `GET /`: backend liveness.
    pub async fn status(&self) -> Result<bool, ApiError> {
        self.send_json("status", self.client.get(self.url("/")))
            .await
    }
}

#[async_trait]
impl LogSource for ApiClient {
    async fn fetch_requests(&self, params: &RequestsParams) -> Result<LogPage, ApiError> {
        self.requests(params).await
    }
}

#[async_trait]
impl SuggestionSource for ApiClient {
    async fn search_suggestions(&self, keyword: &str) -> Result<Vec<String>, ApiError> {
        let builder = self
            .get("/requests/search/suggestions")
            .query(&[("keyword", keyword)]);
        self.send_json("search-suggestions", builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/requests"), "http://localhost:8080/requests");
    }

    #[test]
    fn test_message_response_tolerates_empty_object() {
        let msg: MessageResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(msg.msg, "");
    }
}
