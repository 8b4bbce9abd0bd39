//! Dismissible chips describing the active filters.

use super::state::{FilterState, FilterUpdate};
use crate::model::HttpMethod;
use std::fmt;

/// Longest search text shown on a chip before it is truncated from the left.
const SEARCH_CHIP_MAX_CHARS: usize = 18;

/// One active filter, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChip {
    Search(String),
    Method(HttpMethod),
    Status(String),
    SlowerThan(String),
    FasterThan(String),
}

impl FilterChip {
    /// Update that clears exactly the field this chip represents.
    pub fn clearing_update(&self) -> FilterUpdate {
        match self {
            FilterChip::Search(_) => FilterUpdate::new().search(""),
            FilterChip::Method(_) => FilterUpdate::new().method(HttpMethod::All),
            FilterChip::Status(_) => FilterUpdate::new().status(""),
            FilterChip::SlowerThan(_) => FilterUpdate::new().res_time_gt(""),
            FilterChip::FasterThan(_) => FilterUpdate::new().res_time_lt(""),
        }
    }
}

impl fmt::Display for FilterChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChip::Search(search) => write!(f, "Search: {}", search_chip_text(search)),
            FilterChip::Method(method) => write!(f, "Method: {}", method),
            FilterChip::Status(status) => write!(f, "Status: {}", status),
            FilterChip::SlowerThan(ms) => write!(f, "> {} ms", ms),
            FilterChip::FasterThan(ms) => write!(f, "< {} ms", ms),
        }
    }
}

/// Active chips in display order: search, method, status, `>`, `<`.
pub fn applied_filters(filter: &FilterState) -> Vec<FilterChip> {
    let mut chips = Vec::new();
    if !filter.search.is_empty() {
        chips.push(FilterChip::Search(filter.search.clone()));
    }
    if !filter.method.is_all() {
        chips.push(FilterChip::Method(filter.method));
    }
    if !filter.status.is_empty() {
        chips.push(FilterChip::Status(filter.status.clone()));
    }
    if !filter.res_time_gt.is_empty() {
        chips.push(FilterChip::SlowerThan(filter.res_time_gt.clone()));
    }
    if !filter.res_time_lt.is_empty() {
        chips.push(FilterChip::FasterThan(filter.res_time_lt.clone()));
    }
    chips
}

/// Path of an absolute URL, or the input unchanged, keeping only the last
/// characters when it is too long for a chip.
fn search_chip_text(search: &str) -> String {
    let path = match reqwest::Url::parse(search) {
        Ok(url) => url.path().to_string(),
        Err(_) => search.to_string(),
    };

    let len = path.chars().count();
    if len <= SEARCH_CHIP_MAX_CHARS {
        return path;
    }
    let tail: String = path.chars().skip(len - SEARCH_CHIP_MAX_CHARS).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_order_and_labels() {
        let filter = FilterState {
            search: "/users".to_string(),
            method: HttpMethod::Post,
            status: "500".to_string(),
            res_time_gt: "50".to_string(),
            res_time_lt: "900".to_string(),
            ..Default::default()
        };
        let labels: Vec<String> = applied_filters(&filter)
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["Search: /users", "Method: POST", "Status: 500", "> 50 ms", "< 900 ms"]
        );
    }

    #[test]
    fn test_no_chips_for_defaults() {
        assert!(applied_filters(&FilterState::default()).is_empty());
    }

    #[test]
    fn test_search_chip_uses_url_path() {
        let chip = FilterChip::Search("https://api.example.com/v1/users?x=1".to_string());
        assert_eq!(chip.to_string(), "Search: /v1/users");
    }

    #[test]
    fn test_search_chip_truncates_long_paths() {
        let chip = FilterChip::Search("/api/v2/organizations/members".to_string());
        assert_eq!(chip.to_string(), "Search: ...anizations/members");
    }

    #[test]
    fn test_clearing_update_touches_one_field() {
        let update = FilterChip::Status("404".to_string()).clearing_update();
        assert_eq!(update.status, Some(String::new()));
        assert!(update.search.is_none());
        assert!(update.method.is_none());
        assert!(update.res_time_lt.is_none());
        assert!(update.res_time_gt.is_none());
        assert!(update.time_range.is_none());
    }
}
