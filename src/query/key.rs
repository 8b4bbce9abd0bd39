use crate::filter::{FilterState, PaginationState};
use crate::model::HttpMethod;

/// Identity of a historical query.
///
/// Everything that selects *which* entries are shown, minus the raw time
/// bounds: those slide with the clock and would otherwise make every tick a
/// new query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub method: HttpMethod,
    pub search: String,
    pub status: String,
    pub res_time_lt: String,
    pub res_time_gt: String,
    pub page_offset: usize,
    pub page_size: usize,
}

impl QueryKey {
    pub fn new(filter: &FilterState, pagination: &PaginationState) -> Self {
        Self {
            method: filter.method,
            search: filter.search.clone(),
            status: filter.status.clone(),
            res_time_lt: filter.res_time_lt.clone(),
            res_time_gt: filter.res_time_gt.clone(),
            page_offset: pagination.page_offset,
            page_size: pagination.page_size,
        }
    }
}
