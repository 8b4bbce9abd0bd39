//! Filter State Store.
//!
//! Single owner of the request log's query parameters and pagination window.
//! State only changes through the update methods on [`FilterStore`]; every
//! committed change is published as a whole [`Revision`] on a watch channel.

mod chips;
mod presets;
mod state;

pub use chips::{applied_filters, FilterChip};
pub use presets::{TimeRangePreset, Timeframe};
pub use state::*;

use chrono::{DateTime, Utc};
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;
use tokio::sync::watch;

/// Set of fields touched by one committed update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes(u16);

impl Changes {
    pub const NONE: Changes = Changes(0);
    pub const TIME_RANGE: Changes = Changes(1);
    pub const SEARCH: Changes = Changes(1 << 1);
    pub const METHOD: Changes = Changes(1 << 2);
    pub const STATUS: Changes = Changes(1 << 3);
    pub const RES_TIME_LT: Changes = Changes(1 << 4);
    pub const RES_TIME_GT: Changes = Changes(1 << 5);
    pub const PAGE_OFFSET: Changes = Changes(1 << 6);
    pub const PAGE_SIZE: Changes = Changes(1 << 7);
    pub const TOTAL_ITEMS: Changes = Changes(1 << 8);

    /// Filter fields other than the time bounds.
    pub const FILTERS: Changes = Changes(
        Self::SEARCH.0 | Self::METHOD.0 | Self::STATUS.0 | Self::RES_TIME_LT.0 | Self::RES_TIME_GT.0,
    );

    pub fn contains(self, other: Changes) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Changes) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn between(before: &Revision, filter: &FilterState, pagination: &PaginationState) -> Changes {
        let mut changes = Changes::NONE;
        let old = &before.filter;
        if old.time_range_from != filter.time_range_from || old.time_range_to != filter.time_range_to
        {
            changes |= Changes::TIME_RANGE;
        }
        if old.search != filter.search {
            changes |= Changes::SEARCH;
        }
        if old.method != filter.method {
            changes |= Changes::METHOD;
        }
        if old.status != filter.status {
            changes |= Changes::STATUS;
        }
        if old.res_time_lt != filter.res_time_lt {
            changes |= Changes::RES_TIME_LT;
        }
        if old.res_time_gt != filter.res_time_gt {
            changes |= Changes::RES_TIME_GT;
        }
        let old = &before.pagination;
        if old.page_offset != pagination.page_offset {
            changes |= Changes::PAGE_OFFSET;
        }
        if old.page_size != pagination.page_size {
            changes |= Changes::PAGE_SIZE;
        }
        if old.total_items != pagination.total_items {
            changes |= Changes::TOTAL_ITEMS;
        }
        changes
    }
}

impl BitOr for Changes {
    type Output = Changes;

    fn bitor(self, rhs: Changes) -> Changes {
        Changes(self.0 | rhs.0)
    }
}

impl BitOrAssign for Changes {
    fn bitor_assign(&mut self, rhs: Changes) {
        self.0 |= rhs.0;
    }
}

/// What caused a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    /// State the store was created with.
    Initial,
    /// A user-initiated edit.
    Edit,
    /// The visible time window slid forward with the clock.
    Drift,
}

/// Whole-value snapshot published after every committed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub seq: u64,
    pub filter: FilterState,
    pub pagination: PaginationState,
    pub changes: Changes,
    pub cause: ChangeCause,
    /// Count of explicit time-window edits, so a consumer that only sees the
    /// latest revision can still tell one happened.
    pub window_edits: u64,
}

/// Shared handle to the filter and pagination state.
///
/// Cloning the store yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct FilterStore {
    tx: Arc<watch::Sender<Revision>>,
}

impl FilterStore {
    pub fn new(filter: FilterState, pagination: PaginationState) -> Self {
        let (tx, _rx) = watch::channel(Revision {
            seq: 0,
            filter,
            pagination,
            changes: Changes::NONE,
            cause: ChangeCause::Initial,
            window_edits: 0,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Store holding the last 24 hours, all methods and the given page size.
    pub fn with_defaults(page_size: usize, now: DateTime<Utc>) -> Self {
        Self::new(
            FilterState::last_day(now),
            PaginationState {
                page_size,
                ..Default::default()
            },
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<Revision> {
        self.tx.subscribe()
    }

    pub fn revision(&self) -> Revision {
        self.tx.borrow().clone()
    }

    pub fn filter(&self) -> FilterState {
        self.tx.borrow().filter.clone()
    }

    pub fn pagination(&self) -> PaginationState {
        self.tx.borrow().pagination
    }

    /// Apply a partial filter update. An explicit time range in the update
    /// counts as a user edit of the window and returns to the first page.
    pub fn set_filter(&self, update: FilterUpdate) -> Changes {
        let explicit_window = update.time_range.is_some();
        self.commit(ChangeCause::Edit, |filter, pagination| {
            update.apply(filter);
            if explicit_window {
                pagination.page_offset = 0;
            }
        })
    }

    /// Apply a partial pagination update.
    pub fn set_pagination(&self, update: PaginationUpdate) -> Changes {
        self.commit(ChangeCause::Edit, |_, pagination| update.apply(pagination))
    }

    /// Return to the first page. Returns whether anything changed.
    pub fn reset_offset(&self) -> bool {
        !self
            .set_pagination(PaginationUpdate {
                page_offset: Some(0),
                ..Default::default()
            })
            .is_empty()
    }

    /// Explicitly select a time window, returning to the first page.
    pub fn set_time_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Changes {
        self.set_filter(FilterUpdate::new().time_range(from, to))
    }

    pub fn apply_preset(&self, preset: TimeRangePreset, now: DateTime<Utc>) -> Changes {
        let (from, to) = preset.range(now);
        self.set_time_range(from, to)
    }

    /// Slide the window so it ends at `now`, keeping its length.
    ///
    /// Published as [`ChangeCause::Drift`]; pagination is left alone.
    pub fn slide_window(&self, now: DateTime<Utc>) -> Changes {
        self.commit(ChangeCause::Drift, |filter, _| {
            if let (Some(from), Some(to)) = (filter.time_range_from, filter.time_range_to) {
                let elapsed = now - to;
                filter.time_range_from = Some(from + elapsed);
                filter.time_range_to = Some(now);
            }
        })
    }

    /// Record the latest total reported by the backend. An offset past the
    /// end of the result set snaps back to the first page.
    pub fn set_total_items(&self, total: usize) -> Changes {
        self.commit(ChangeCause::Edit, |_, pagination| {
            pagination.total_items = total;
            if pagination.page_offset > 0 && pagination.page_offset >= total {
                pagination.page_offset = 0;
            }
        })
    }

    /// Set one response-time threshold and clear the other.
    pub fn set_response_time(&self, bound: ResponseTimeBound, value: &str) -> Changes {
        self.set_filter(FilterUpdate::new().response_time(bound, value))
    }

    pub fn applied_filters(&self) -> Vec<FilterChip> {
        applied_filters(&self.tx.borrow().filter)
    }

    /// Dismiss one chip, restoring only its field to the default.
    pub fn remove_filter(&self, chip: &FilterChip) -> Changes {
        self.set_filter(chip.clearing_update())
    }

    fn commit<F>(&self, cause: ChangeCause, mutate: F) -> Changes
    where
        F: FnOnce(&mut FilterState, &mut PaginationState),
    {
        let mut committed = Changes::NONE;
        self.tx.send_if_modified(|rev| {
            let mut filter = rev.filter.clone();
            let mut pagination = rev.pagination;
            mutate(&mut filter, &mut pagination);

            let edited = Changes::between(rev, &filter, &pagination);
            if cause == ChangeCause::Edit
                && edited.intersects(Changes::FILTERS)
                && pagination.page_offset > 0
            {
                pagination.page_offset = 0;
            }

            let changes = Changes::between(rev, &filter, &pagination);
            if changes.is_empty() {
                return false;
            }

            rev.seq += 1;
            rev.filter = filter;
            rev.pagination = pagination;
            rev.changes = changes;
            rev.cause = cause;
            if cause == ChangeCause::Edit && changes.contains(Changes::TIME_RANGE) {
                rev.window_edits += 1;
            }
            committed = changes;
            true
        });

        if !committed.is_empty() {
            tracing::debug!(changes = ?committed, ?cause, "Filter state updated");
        }
        committed
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_PAGE_SIZE, Utc::now())
    }
}
