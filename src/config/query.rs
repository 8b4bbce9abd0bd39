//! Historical query configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Seconds between background re-issues of the current query
    pub refresh_interval_seconds: u64,
    /// Initial page size (15, 50 or 100)
    pub default_page_size: usize,
    /// Delay before a search-suggestion lookup fires
    pub search_debounce_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 120,
            default_page_size: 15,
            search_debounce_ms: 350,
        }
    }
}
