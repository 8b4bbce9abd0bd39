//! Live Stream Client.
//!
//! Keeps a websocket to `/requests-ws` open while live mode is enabled and
//! exposes the most recent snapshot of entries pushed by the backend. The
//! lifecycle rules live in [`StreamMachine`]; [`LiveStreamClient`] runs a
//! driver task that executes its actions.

mod error;
mod machine;
mod transport;

pub use error::StreamError;
pub use machine::{ReadyState, StreamAction, StreamMachine, AUTH_FAILED_REASON};
pub use transport::{CloseInfo, Connection, Connector, FrameSink, TransportEvent, WsConnector};

use crate::config::StreamConfig;
use crate::model::LogEntry;
use crate::session::Session;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Latest entries received on the stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSnapshot {
    /// Enable/disable cycle the entries belong to
    pub epoch: u64,
    pub entries: Vec<LogEntry>,
}

/// Shared state the driver writes through. Writes from a driver whose epoch
/// is no longer current are dropped.
#[derive(Clone)]
struct Shared {
    epoch: Arc<AtomicU64>,
    buffer: Arc<watch::Sender<StreamSnapshot>>,
    ready_state: Arc<watch::Sender<ReadyState>>,
}

impl Shared {
    fn is_current(&self, epoch: u64, cancel: &CancellationToken) -> bool {
        !cancel.is_cancelled() && self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn replace_entries(&self, epoch: u64, cancel: &CancellationToken, entries: Vec<LogEntry>) -> bool {
        self.buffer.send_if_modified(|snapshot| {
            if !self.is_current(epoch, cancel) {
                return false;
            }
            snapshot.epoch = epoch;
            snapshot.entries = entries;
            true
        })
    }

    fn set_state(&self, epoch: u64, cancel: &CancellationToken, state: ReadyState) {
        self.ready_state.send_if_modified(|current| {
            if !self.is_current(epoch, cancel) || *current == state {
                return false;
            }
            *current = state;
            true
        });
    }
}

struct Driver {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Live tail of the request log.
pub struct LiveStreamClient {
    connector: Arc<dyn Connector>,
    url: String,
    config: StreamConfig,
    session: Session,
    shared: Shared,
    driver: Option<Driver>,
}

impl LiveStreamClient {
    pub fn new(
        connector: Arc<dyn Connector>,
        url: impl Into<String>,
        config: StreamConfig,
        session: Session,
    ) -> Self {
        let (buffer, _) = watch::channel(StreamSnapshot::default());
        let (ready_state, _) = watch::channel(ReadyState::Uninstantiated);
        Self {
            connector,
            url: url.into(),
            config,
            session,
            shared: Shared {
                epoch: Arc::new(AtomicU64::new(0)),
                buffer: Arc::new(buffer),
                ready_state: Arc::new(ready_state),
            },
            driver: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True while a driver is running. A driver that gave up on its own no
    /// longer counts.
    pub fn is_enabled(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| !driver.handle.is_finished())
    }

    pub fn subscribe(&self) -> watch::Receiver<StreamSnapshot> {
        self.shared.buffer.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ReadyState> {
        self.shared.ready_state.subscribe()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.shared.buffer.borrow().entries.clone()
    }

    pub fn ready_state(&self) -> ReadyState {
        *self.shared.ready_state.borrow()
    }

    /// Open the stream, authenticating with `token`. Does nothing when
    /// already enabled.
    pub fn enable(&mut self, token: &str) -> Result<(), StreamError> {
        if token.is_empty() {
            return Err(StreamError::MissingToken);
        }
        if self.is_enabled() {
            return Ok(());
        }
        if self.driver.is_some() {
            // The previous driver gave up; start over with an empty buffer
            self.stop(ReadyState::Closed);
        }

        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        tracing::info!(url = %self.url, epoch, "Enabling live stream");

        let run = DriverTask {
            connector: self.connector.clone(),
            url: self.url.clone(),
            machine: StreamMachine::new(&self.config),
            session: self.session.clone(),
            shared: self.shared.clone(),
            epoch,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(run.run(token.to_string()));
        self.driver = Some(Driver { cancel, handle });
        Ok(())
    }

    /// Close the stream and clear the buffer.
    ///
    /// Takes effect immediately: frames still in flight from the old
    /// connection are never applied.
    pub fn disable(&mut self) {
        self.stop(ReadyState::Closed);
    }

    /// Disable and wait for the driver to finish its close handshake.
    /// The ready state reads `Closing` until the handshake is done.
    pub async fn shutdown(&mut self) {
        let state = if self.is_enabled() {
            ReadyState::Closing
        } else {
            ReadyState::Closed
        };
        if let Some(handle) = self.stop(state) {
            let _ = handle.await;
            self.shared.ready_state.send_replace(ReadyState::Closed);
        }
    }

    /// Wait for the driver to stop on its own, after the reconnect budget is
    /// spent or the token is rejected. Never resolves while disabled.
    pub async fn stopped(&mut self) {
        let Some(driver) = self.driver.as_mut() else {
            return futures::future::pending().await;
        };
        let _ = (&mut driver.handle).await;
        self.driver = None;
    }

    /// Cancel the driver, clear the buffer and publish `state`.
    fn stop(&mut self, state: ReadyState) -> Option<JoinHandle<()>> {
        let handle = self.driver.take().map(|driver| {
            driver.cancel.cancel();
            tracing::info!(url = %self.url, "Disabling live stream");
            driver.handle
        });
        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.buffer.send_replace(StreamSnapshot {
            epoch,
            entries: Vec::new(),
        });
        if handle.is_some() {
            self.shared.ready_state.send_replace(state);
        }
        handle
    }
}

impl Drop for LiveStreamClient {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.cancel.cancel();
        }
    }
}

/// Executes machine actions for one enable/disable cycle.
struct DriverTask {
    connector: Arc<dyn Connector>,
    url: String,
    machine: StreamMachine,
    session: Session,
    shared: Shared,
    epoch: u64,
    cancel: CancellationToken,
}

impl DriverTask {
    async fn run(mut self, token: String) {
        let mut pending: VecDeque<StreamAction> = self.machine.enable(token).into();
        let mut connection: Option<Connection> = None;

        loop {
            while let Some(action) = pending.pop_front() {
                let follow_up = match action {
                    StreamAction::Connect => {
                        self.publish_state();
                        let connect = self.connector.connect(&self.url);
                        let result = tokio::select! {
                            _ = self.cancel.cancelled() => return,
                            result = connect => result,
                        };
                        match result {
                            Ok(conn) => {
                                connection = Some(conn);
                                self.machine.on_open()
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Live stream connection failed");
                                self.machine.on_connect_failed()
                            }
                        }
                    }
                    StreamAction::SendAuth(token) => {
                        let sent = match connection.as_mut() {
                            Some(conn) => conn.sink.send_text(token).await,
                            None => Err(StreamError::Protocol("not connected".to_string())),
                        };
                        match sent {
                            Ok(()) => Vec::new(),
                            Err(e) => {
                                tracing::warn!(error = %e, "Live stream authentication not sent");
                                connection = None;
                                self.machine.on_close(None)
                            }
                        }
                    }
                    StreamAction::ScheduleReconnect(delay) => {
                        self.publish_state();
                        tracing::info!(delay_ms = delay.as_millis() as u64, "Reconnecting live stream");
                        tokio::select! {
                            _ = self.cancel.cancelled() => return,
                            _ = tokio::time::sleep(delay) => self.machine.on_reconnect_due(),
                        }
                    }
                    StreamAction::Close => {
                        if let Some(mut conn) = connection.take() {
                            conn.sink.close().await;
                        }
                        Vec::new()
                    }
                    StreamAction::LoggedOut(reason) => {
                        if self.shared.is_current(self.epoch, &self.cancel) {
                            self.session.log_out(reason);
                        }
                        Vec::new()
                    }
                };
                pending.extend(follow_up);
            }

            self.publish_state();
            let Some(conn) = connection.as_mut() else {
                tracing::info!(state = %self.machine.state(), "Live stream stopped");
                return;
            };

            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.machine.disable();
                    conn.sink.close().await;
                    return;
                }
                event = conn.events.recv() => event,
            };

            match event {
                Some(TransportEvent::Text(text)) => {
                    if let Some(entries) = self.machine.on_message(&text) {
                        tracing::trace!(count = entries.len(), "Stream snapshot received");
                        self.shared.replace_entries(self.epoch, &self.cancel, entries);
                    }
                }
                Some(TransportEvent::Closed(info)) => {
                    let reason = info.as_ref().map(|i| i.reason.as_str());
                    tracing::info!(reason = ?reason, "Live stream closed by peer");
                    connection = None;
                    pending.extend(self.machine.on_close(reason));
                }
                None => {
                    connection = None;
                    pending.extend(self.machine.on_close(None));
                }
            }
        }
    }

    fn publish_state(&self) {
        self.shared
            .set_state(self.epoch, &self.cancel, self.machine.state());
    }
}
