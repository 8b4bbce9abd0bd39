//! Query parameters for `/requests`.

use crate::filter::{FilterState, PaginationState};
use crate::model::HttpMethod;
use chrono::{DateTime, SecondsFormat, Utc};

/// Format an instant the way the backend expects (`2024-01-01T10:00:00.000Z`).
pub fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fully resolved parameters of one historical page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestsParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub index: usize,
    pub limit: usize,
    pub method: HttpMethod,
    pub search: String,
    pub status: String,
    pub res_time_lt: String,
    pub res_time_gt: String,
}

impl RequestsParams {
    /// Build request parameters from the store's state. Returns `None` while
    /// either time bound is unset.
    pub fn from_state(filter: &FilterState, pagination: &PaginationState) -> Option<Self> {
        let (from, to) = (filter.time_range_from?, filter.time_range_to?);
        Some(Self {
            from,
            to,
            index: pagination.page_offset,
            limit: pagination.page_size,
            method: filter.method,
            search: filter.search.clone(),
            status: filter.status.clone(),
            res_time_lt: filter.res_time_lt.clone(),
            res_time_gt: filter.res_time_gt.clone(),
        })
    }

    /// Query string pairs in the backend's naming. Empty filters are sent as
    /// empty strings.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("from", iso(self.from)),
            ("to", iso(self.to)),
            ("index", self.index.to_string()),
            ("limit", self.limit.to_string()),
            ("method", self.method.as_str().to_string()),
            ("search", self.search.clone()),
            ("status", self.status.clone()),
            ("resTimeLT", self.res_time_lt.clone()),
            ("resTimeGT", self.res_time_gt.clone()),
        ]
    }
}
