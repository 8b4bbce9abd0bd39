//! Mode Switch Controller.
//!
//! Historical and live views are mutually exclusive: the websocket is only
//! open while [`Mode::Live`] is selected, and the displayed list comes from
//! exactly one source at a time.

use crate::model::{LogEntry, LogPage};
use crate::query::QueryOutcome;
use crate::session::Session;
use crate::stream::{LiveStreamClient, StreamError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Historical,
    Live,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Historical => f.write_str("historical"),
            Mode::Live => f.write_str("live"),
        }
    }
}

/// Tells consumers to drop any row selection they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReset {
    ModeSwitched(Mode),
    PageChanged,
}

const HISTORICAL_EMPTY_LABEL: &str = "Nothing to display for this timeframe";
const LIVE_EMPTY_LABEL: &str = "Waiting for requests";

/// What the request list should display.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Historical(LogPage),
    Live(Vec<LogEntry>),
}

impl DataSource {
    pub fn entries(&self) -> &[LogEntry] {
        match self {
            DataSource::Historical(page) => &page.entries,
            DataSource::Live(entries) => entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Placeholder shown when there is nothing to list.
    pub fn empty_label(&self) -> &'static str {
        match self {
            DataSource::Historical(_) => HISTORICAL_EMPTY_LABEL,
            DataSource::Live(_) => LIVE_EMPTY_LABEL,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("Live mode requires a session token")]
    MissingToken,

    #[error(transparent)]
    Stream(#[from] StreamError),
}

pub struct ModeController {
    mode: watch::Sender<Mode>,
    stream: LiveStreamClient,
    outcomes: watch::Receiver<QueryOutcome>,
    session: Session,
    resets: broadcast::Sender<SelectionReset>,
}

impl ModeController {
    pub fn new(
        stream: LiveStreamClient,
        outcomes: watch::Receiver<QueryOutcome>,
        session: Session,
        resets: broadcast::Sender<SelectionReset>,
    ) -> Self {
        let (mode, _) = watch::channel(Mode::Historical);
        Self {
            mode,
            stream,
            outcomes,
            session,
            resets,
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Mode> {
        self.mode.subscribe()
    }

    pub fn subscribe_resets(&self) -> broadcast::Receiver<SelectionReset> {
        self.resets.subscribe()
    }

    pub fn stream(&self) -> &LiveStreamClient {
        &self.stream
    }

    /// Switch modes. Returns `Ok(false)` when `mode` is already active.
    pub fn set_mode(&mut self, mode: Mode) -> Result<bool, ModeError> {
        if mode == self.mode() {
            return Ok(false);
        }

        match mode {
            Mode::Live => {
                let token = self.session.token().ok_or(ModeError::MissingToken)?;
                self.stream.enable(&token)?;
            }
            Mode::Historical => self.stream.disable(),
        }

        self.mode.send_replace(mode);
        tracing::info!(%mode, "Switched request log mode");
        let _ = self.resets.send(SelectionReset::ModeSwitched(mode));
        Ok(true)
    }

    pub fn toggle(&mut self) -> Result<Mode, ModeError> {
        let next = match self.mode() {
            Mode::Historical => Mode::Live,
            Mode::Live => Mode::Historical,
        };
        self.set_mode(next)?;
        Ok(next)
    }

    /// Entries to display for the active mode.
    pub fn data_source(&self) -> DataSource {
        match self.mode() {
            Mode::Historical => DataSource::Historical(self.outcomes.borrow().page.clone()),
            Mode::Live => DataSource::Live(self.stream.entries()),
        }
    }

    /// Paging only applies to historical results.
    pub fn pagination_enabled(&self) -> bool {
        self.mode() == Mode::Historical
    }

    pub fn empty_label(&self) -> &'static str {
        match self.mode() {
            Mode::Historical => HISTORICAL_EMPTY_LABEL,
            Mode::Live => LIVE_EMPTY_LABEL,
        }
    }

    /// Resolves when the live stream gives up while live mode is selected.
    pub async fn live_stopped(&mut self) {
        self.stream.stopped().await;
    }

    /// Leave live mode and wait for the stream to close.
    pub async fn shutdown(&mut self) {
        self.stream.shutdown().await;
        self.mode.send_replace(Mode::Historical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use crate::stream::{Connection, Connector, ReadyState};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Connector whose connections never complete.
    #[derive(Default)]
    struct HangingConnector {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Connector for HangingConnector {
        async fn connect(&self, _url: &str) -> Result<Connection, StreamError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            futures::future::pending().await
        }
    }

    fn controller(token: Option<&str>) -> (ModeController, Arc<HangingConnector>) {
        let connector = Arc::new(HangingConnector::default());
        let session = Session::new(token.map(str::to_string));
        let stream = LiveStreamClient::new(
            connector.clone(),
            "ws://fake/requests-ws",
            StreamConfig::default(),
            session.clone(),
        );
        let page = LogPage {
            entries: Vec::new(),
            total_items: 3,
        };
        let (_tx, outcomes) = watch::channel(QueryOutcome {
            generation: 1,
            page,
            ..Default::default()
        });
        let (resets, _) = broadcast::channel(8);
        (ModeController::new(stream, outcomes, session, resets), connector)
    }

    #[tokio::test]
    async fn test_switch_to_live_and_back() {
        let (mut modes, connector) = controller(Some("tok"));
        let mut resets = modes.subscribe_resets();

        assert_eq!(modes.set_mode(Mode::Live), Ok(true));
        assert_eq!(modes.mode(), Mode::Live);
        assert!(modes.stream().is_enabled());
        assert!(!modes.pagination_enabled());
        assert_eq!(modes.data_source(), DataSource::Live(Vec::new()));
        assert_eq!(modes.empty_label(), "Waiting for requests");
        assert_eq!(modes.data_source().empty_label(), "Waiting for requests");
        assert_eq!(
            resets.recv().await.unwrap(),
            SelectionReset::ModeSwitched(Mode::Live)
        );

        tokio::task::yield_now().await;
        assert!(connector.attempts.load(Ordering::SeqCst) <= 1);

        assert_eq!(modes.set_mode(Mode::Historical), Ok(true));
        assert!(!modes.stream().is_enabled());
        assert_eq!(modes.stream().ready_state(), ReadyState::Closed);
        assert!(modes.pagination_enabled());
        match modes.data_source() {
            DataSource::Historical(page) => assert_eq!(page.total_items, 3),
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(
            resets.recv().await.unwrap(),
            SelectionReset::ModeSwitched(Mode::Historical)
        );
    }

    #[tokio::test]
    async fn test_same_mode_is_noop() {
        let (mut modes, _) = controller(Some("tok"));
        let mut resets = modes.subscribe_resets();
        assert_eq!(modes.set_mode(Mode::Historical), Ok(false));
        assert!(resets.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_live_requires_token() {
        let (mut modes, connector) = controller(None);
        assert_eq!(modes.set_mode(Mode::Live), Err(ModeError::MissingToken));
        assert_eq!(modes.mode(), Mode::Historical);
        assert!(!modes.stream().is_enabled());
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_toggle() {
        let (mut modes, _) = controller(Some("tok"));
        assert_eq!(modes.toggle(), Ok(Mode::Live));
        assert_eq!(modes.toggle(), Ok(Mode::Historical));
        assert_eq!(modes.empty_label(), "Nothing to display for this timeframe");
    }
}
