//! Historical Query Engine.
//!
//! Turns the filter store's state into `/requests` calls and publishes the
//! latest applicable page. Every issued request carries a generation number;
//! a response is only published while its generation is still the newest, so
//! a slow older response can never overwrite a newer one.

mod debounce;
mod error;
mod key;
mod suggestions;

pub use debounce::Debouncer;
pub use error::QueryError;
pub use key::QueryKey;
pub use suggestions::SuggestionFetcher;

use crate::api::{ApiError, LogSource, RequestsParams};
use crate::config::QueryConfig;
use crate::filter::{FilterState, FilterStore, PaginationState, Revision};
use crate::model::LogPage;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Latest page published by the engine.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    /// Generation of the request this outcome came from (0 before any fetch)
    pub generation: u64,
    pub key: Option<QueryKey>,
    /// Empty when the request failed
    pub page: LogPage,
    pub error: Option<ApiError>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl QueryOutcome {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Bookkeeping the driver uses to decide whether a revision needs a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerState {
    last_key: Option<QueryKey>,
    window_edits: u64,
}

impl TriggerState {
    /// Whether `rev` calls for a new request. Updates the bookkeeping when it
    /// does.
    ///
    /// A changed [`QueryKey`] or an explicit window edit triggers; a window
    /// that merely drifted with the clock does not.
    pub fn observe(&mut self, rev: &Revision) -> bool {
        if !rev.filter.has_time_range() {
            return false;
        }
        let key = QueryKey::new(&rev.filter, &rev.pagination);
        let key_changed = self.last_key.as_ref() != Some(&key);
        let window_edited = rev.window_edits != self.window_edits;

        self.window_edits = rev.window_edits;
        if key_changed || window_edited {
            self.last_key = Some(key);
            return true;
        }
        false
    }
}

/// Fetches and publishes historical log pages.
#[derive(Clone)]
pub struct HistoricalQueryEngine {
    source: Arc<dyn LogSource>,
    generation: Arc<AtomicU64>,
    outcome: Arc<watch::Sender<QueryOutcome>>,
    refetch: Arc<Notify>,
    refresh_interval: Duration,
}

impl HistoricalQueryEngine {
    pub fn new(source: Arc<dyn LogSource>, config: &QueryConfig) -> Self {
        Self::with_refresh_interval(
            source,
            Duration::from_secs(config.refresh_interval_seconds),
        )
    }

    pub fn with_refresh_interval(source: Arc<dyn LogSource>, refresh_interval: Duration) -> Self {
        let (outcome, _) = watch::channel(QueryOutcome::default());
        Self {
            source,
            generation: Arc::new(AtomicU64::new(0)),
            outcome: Arc::new(outcome),
            refetch: Arc::new(Notify::new()),
            refresh_interval,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryOutcome> {
        self.outcome.subscribe()
    }

    pub fn outcome(&self) -> QueryOutcome {
        self.outcome.borrow().clone()
    }

    /// Generation of the most recently issued request.
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch one page directly, without publishing it.
    pub async fn fetch_page(
        &self,
        filter: &FilterState,
        pagination: &PaginationState,
    ) -> Result<LogPage, QueryError> {
        let params =
            RequestsParams::from_state(filter, pagination).ok_or(QueryError::MissingTimeRange)?;
        Ok(self.source.fetch_requests(&params).await?)
    }

    /// Issue a request for the given state in its own task.
    ///
    /// Returns `None` without doing anything when the time range is
    /// incomplete. The task resolves to whether its result was published.
    pub fn issue(
        &self,
        filter: &FilterState,
        pagination: &PaginationState,
    ) -> Option<JoinHandle<bool>> {
        let params = RequestsParams::from_state(filter, pagination)?;
        let key = QueryKey::new(filter, pagination);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, offset = params.index, limit = params.limit, "Issuing query");

        let engine = self.clone();
        Some(tokio::spawn(async move {
            let result = engine.source.fetch_requests(&params).await;
            engine.publish(generation, key, result)
        }))
    }

    /// Ask a running driver to re-issue the current query.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }

    fn publish(&self, generation: u64, key: QueryKey, result: Result<LogPage, ApiError>) -> bool {
        let (page, error) = match result {
            Ok(page) => (page, None),
            Err(e) => {
                tracing::warn!(generation, error = %e, "Historical query failed");
                (LogPage::empty(), Some(e))
            }
        };

        let applied = self.outcome.send_if_modified(|current| {
            let latest = self.generation.load(Ordering::SeqCst);
            if generation != latest || generation <= current.generation {
                return false;
            }
            *current = QueryOutcome {
                generation,
                key: Some(key),
                page,
                error,
                fetched_at: Some(Utc::now()),
            };
            true
        });

        if !applied {
            metrics::counter!("reqwatch_query_stale_discarded_total").increment(1);
            tracing::debug!(generation, "Discarded stale query response");
        }
        applied
    }

    /// Start the driver loop.
    ///
    /// Fetches immediately, then whenever the store publishes a revision that
    /// needs it, when [`refetch`](Self::refetch) is called, and on every
    /// refresh tick. Successful totals are written back to the store.
    pub fn start(self, store: FilterStore, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut revisions = store.subscribe();
            let mut outcomes = self.subscribe();
            let mut triggers = TriggerState::default();

            let mut interval = tokio::time::interval(self.refresh_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; the initial fetch below covers it
            interval.tick().await;

            tracing::info!(
                refresh_seconds = self.refresh_interval.as_secs(),
                "Starting historical query engine"
            );

            let rev = revisions.borrow_and_update().clone();
            if triggers.observe(&rev) {
                self.issue(&rev.filter, &rev.pagination);
            }

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Historical query engine shutting down");
                        break;
                    }
                    changed = revisions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let rev = revisions.borrow_and_update().clone();
                        if triggers.observe(&rev) {
                            self.issue(&rev.filter, &rev.pagination);
                        }
                    }
                    _ = self.refetch.notified() => {
                        let rev = store.revision();
                        self.issue(&rev.filter, &rev.pagination);
                    }
                    _ = interval.tick() => {
                        let rev = store.revision();
                        tracing::trace!("Auto-refresh tick");
                        self.issue(&rev.filter, &rev.pagination);
                    }
                    changed = outcomes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let outcome = outcomes.borrow_and_update().clone();
                        if outcome.error.is_none() {
                            store.set_total_items(outcome.page.total_items);
                        }
                    }
                }
            }
        })
    }
}
