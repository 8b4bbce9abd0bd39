//! Pagination Controller.
//!
//! Moves the historical page window through the [`FilterStore`], bounded by
//! the total item count last reported by the backend.

use crate::filter::{FilterStore, PaginationState, PaginationUpdate, PAGE_SIZES};
use crate::mode::SelectionReset;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page size {0} is not one of 15, 50, 100")]
    InvalidPageSize(usize),
}

/// Page navigation over the shared store.
#[derive(Debug, Clone)]
pub struct PaginationController {
    store: FilterStore,
    resets: broadcast::Sender<SelectionReset>,
}

impl PaginationController {
    pub fn new(store: FilterStore, resets: broadcast::Sender<SelectionReset>) -> Self {
        Self { store, resets }
    }

    pub fn state(&self) -> PaginationState {
        self.store.pagination()
    }

    /// Advance one page. Returns `false` (and does nothing) on the last page.
    pub fn next_page(&self) -> bool {
        match self.state().next_offset() {
            Some(offset) => self.move_to(offset),
            None => false,
        }
    }

    /// Go back one page. Returns `false` (and does nothing) on the first page.
    pub fn prev_page(&self) -> bool {
        match self.state().prev_offset() {
            Some(offset) => self.move_to(offset),
            None => false,
        }
    }

    /// Change the page size, keeping the current offset.
    pub fn set_page_size(&self, size: usize) -> Result<bool, PaginationError> {
        if !PAGE_SIZES.contains(&size) {
            return Err(PaginationError::InvalidPageSize(size));
        }
        let changes = self.store.set_pagination(PaginationUpdate {
            page_size: Some(size),
            ..Default::default()
        });
        Ok(!changes.is_empty())
    }

    pub fn can_go_next(&self) -> bool {
        self.state().next_offset().is_some()
    }

    pub fn can_go_prev(&self) -> bool {
        self.state().prev_offset().is_some()
    }

    pub fn controls_enabled(&self) -> bool {
        self.state().controls_enabled()
    }

    pub fn range_label(&self) -> String {
        self.state().range_label()
    }

    fn move_to(&self, offset: usize) -> bool {
        let changes = self.store.set_pagination(PaginationUpdate {
            page_offset: Some(offset),
            ..Default::default()
        });
        if changes.is_empty() {
            return false;
        }
        tracing::debug!(offset, "Page changed");
        let _ = self.resets.send(SelectionReset::PageChanged);
        true
    }
}
