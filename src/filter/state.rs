//! Filter and pagination values plus partial updates.

use crate::model::HttpMethod;
use chrono::{DateTime, Duration, Utc};

/// Page sizes offered to the user, smallest first.
pub const PAGE_SIZES: [usize; 3] = [15, 50, 100];

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = PAGE_SIZES[0];

/// Current query parameters of the request log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub time_range_from: Option<DateTime<Utc>>,
    pub time_range_to: Option<DateTime<Utc>>,
    /// Endpoint keyword or full URL
    pub search: String,
    pub method: HttpMethod,
    /// Status code as typed (digits only, empty when unset)
    pub status: String,
    /// Only requests faster than this many ms (digits only, empty when unset)
    pub res_time_lt: String,
    /// Only requests slower than this many ms (digits only, empty when unset)
    pub res_time_gt: String,
}

impl FilterState {
    /// Unfiltered view of the 24 hours before `now`.
    pub fn last_day(now: DateTime<Utc>) -> Self {
        Self {
            time_range_from: Some(now - Duration::days(1)),
            time_range_to: Some(now),
            ..Default::default()
        }
    }

    pub fn has_time_range(&self) -> bool {
        self.time_range_from.is_some() && self.time_range_to.is_some()
    }
}

/// Visible window into the historical result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_offset: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_offset: 0,
            page_size: DEFAULT_PAGE_SIZE,
            total_items: 0,
        }
    }
}

impl PaginationState {
    /// Offset after moving one page forward, or `None` when on the last page.
    pub fn next_offset(&self) -> Option<usize> {
        if self.page_offset + self.page_size >= self.total_items {
            return None;
        }
        Some((self.page_offset + self.page_size).min(self.total_items))
    }

    /// Offset after moving one page back, or `None` when on the first page.
    pub fn prev_offset(&self) -> Option<usize> {
        if self.page_offset == 0 {
            return None;
        }
        Some(self.page_offset.saturating_sub(self.page_size))
    }

    /// Paging controls are pointless while everything fits on the smallest page.
    pub fn controls_enabled(&self) -> bool {
        self.total_items > PAGE_SIZES[0]
    }

    /// `"16-30 of 40"`
    pub fn range_label(&self) -> String {
        if self.total_items == 0 {
            return "0-0 of 0".to_string();
        }
        let first = (self.page_offset + 1).min(self.total_items);
        let last = (self.page_offset + self.page_size).min(self.total_items);
        format!("{}-{} of {}", first, last, self.total_items)
    }
}

/// Which response-time bound a threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTimeBound {
    GreaterThan,
    LessThan,
}

/// Partial update of [`FilterState`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub search: Option<String>,
    pub method: Option<HttpMethod>,
    pub status: Option<String>,
    pub res_time_lt: Option<String>,
    pub res_time_gt: Option<String>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.time_range = Some((from, to));
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn res_time_lt(mut self, value: impl Into<String>) -> Self {
        self.res_time_lt = Some(value.into());
        self
    }

    pub fn res_time_gt(mut self, value: impl Into<String>) -> Self {
        self.res_time_gt = Some(value.into());
        self
    }

    /// Set one response-time bound and clear the other.
    pub fn response_time(self, bound: ResponseTimeBound, value: impl Into<String>) -> Self {
        match bound {
            ResponseTimeBound::GreaterThan => self.res_time_gt(value).res_time_lt(""),
            ResponseTimeBound::LessThan => self.res_time_lt(value).res_time_gt(""),
        }
    }

    pub(crate) fn apply(self, filter: &mut FilterState) {
        if let Some((from, to)) = self.time_range {
            filter.time_range_from = Some(from);
            filter.time_range_to = Some(to);
        }
        if let Some(search) = self.search {
            filter.search = search.trim().to_string();
        }
        if let Some(method) = self.method {
            filter.method = method;
        }
        if let Some(status) = self.status {
            filter.status = numeric_or_empty(&status);
        }
        if let Some(lt) = self.res_time_lt {
            filter.res_time_lt = numeric_or_empty(&lt);
        }
        if let Some(gt) = self.res_time_gt {
            filter.res_time_gt = numeric_or_empty(&gt);
        }
    }
}

/// Partial update of [`PaginationState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
    pub page_offset: Option<usize>,
    pub page_size: Option<usize>,
    pub total_items: Option<usize>,
}

impl PaginationUpdate {
    pub(crate) fn apply(self, pagination: &mut PaginationState) {
        if let Some(offset) = self.page_offset {
            pagination.page_offset = offset;
        }
        if let Some(size) = self.page_size {
            pagination.page_size = size;
        }
        if let Some(total) = self.total_items {
            pagination.total_items = total;
        }
    }
}

/// Numeric filter inputs accept digits only; anything else clears the field.
pub fn numeric_or_empty(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        trimmed.to_string()
    } else {
        String::new()
    }
}
