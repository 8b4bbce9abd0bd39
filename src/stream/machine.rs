//! Connection lifecycle as a pure state machine.
//!
//! Transitions never perform I/O; they return the [`StreamAction`]s the
//! driver must carry out.

use crate::config::StreamConfig;
use crate::model::LogEntry;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Close reason the backend uses for a rejected token.
pub const AUTH_FAILED_REASON: &str = "Authentication failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadyState {
    Uninstantiated,
    Connecting,
    Open,
    /// Published by the client while it waits for a requested close handshake.
    Closing,
    Closed,
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReadyState::Uninstantiated => "UNINSTANTIATED",
            ReadyState::Connecting => "CONNECTING",
            ReadyState::Open => "OPEN",
            ReadyState::Closing => "CLOSING",
            ReadyState::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    /// Open a transport connection.
    Connect,
    /// Send the token as the first text frame.
    SendAuth(String),
    /// Call [`StreamMachine::on_reconnect_due`] after the delay.
    ScheduleReconnect(Duration),
    /// Close the transport connection.
    Close,
    /// The backend rejected the token.
    LoggedOut(String),
}

#[derive(Debug, Clone)]
pub struct StreamMachine {
    state: ReadyState,
    token: Option<String>,
    reconnect_attempts: u32,
    attempts_left: u32,
    reconnect_interval: Duration,
    reconnect_pending: bool,
}

impl StreamMachine {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            state: ReadyState::Uninstantiated,
            token: None,
            reconnect_attempts: config.reconnect_attempts,
            attempts_left: config.reconnect_attempts,
            reconnect_interval: config.reconnect_interval(),
            reconnect_pending: false,
        }
    }

    pub fn state(&self) -> ReadyState {
        self.state
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    /// Start connecting with `token`. A machine that is already connecting
    /// or open ignores the call.
    pub fn enable(&mut self, token: String) -> Vec<StreamAction> {
        if matches!(self.state, ReadyState::Connecting | ReadyState::Open) {
            return Vec::new();
        }
        self.token = Some(token);
        self.attempts_left = self.reconnect_attempts;
        self.reconnect_pending = false;
        self.state = ReadyState::Connecting;
        vec![StreamAction::Connect]
    }

    /// The transport connected; authenticate first. A successful open
    /// restores the reconnect budget for the next abnormal closure.
    pub fn on_open(&mut self) -> Vec<StreamAction> {
        if self.state != ReadyState::Connecting {
            return Vec::new();
        }
        self.state = ReadyState::Open;
        self.attempts_left = self.reconnect_attempts;
        match &self.token {
            Some(token) => vec![StreamAction::SendAuth(token.clone())],
            None => Vec::new(),
        }
    }

    /// Parse a text frame. Returns the new snapshot, or `None` when the frame
    /// is not applicable or not a JSON array of entries.
    pub fn on_message(&self, text: &str) -> Option<Vec<LogEntry>> {
        if self.state != ReadyState::Open {
            return None;
        }
        match serde_json::from_str::<Vec<LogEntry>>(text) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed stream frame");
                None
            }
        }
    }

    /// The connection closed without being asked to.
    pub fn on_close(&mut self, reason: Option<&str>) -> Vec<StreamAction> {
        if !matches!(self.state, ReadyState::Connecting | ReadyState::Open) {
            return Vec::new();
        }
        self.state = ReadyState::Closed;

        if reason == Some(AUTH_FAILED_REASON) {
            self.attempts_left = 0;
            return vec![StreamAction::LoggedOut(AUTH_FAILED_REASON.to_string())];
        }
        if self.attempts_left == 0 {
            return Vec::new();
        }
        self.attempts_left -= 1;
        self.reconnect_pending = true;
        vec![StreamAction::ScheduleReconnect(self.reconnect_interval)]
    }

    /// The transport could not be opened at all.
    pub fn on_connect_failed(&mut self) -> Vec<StreamAction> {
        self.on_close(None)
    }

    /// The reconnect delay elapsed.
    pub fn on_reconnect_due(&mut self) -> Vec<StreamAction> {
        if !self.reconnect_pending || self.state != ReadyState::Closed {
            return Vec::new();
        }
        self.reconnect_pending = false;
        self.state = ReadyState::Connecting;
        vec![StreamAction::Connect]
    }

    /// Requested shutdown. Always ends in `Closed` with no reconnect pending.
    pub fn disable(&mut self) -> Vec<StreamAction> {
        let was_live = matches!(self.state, ReadyState::Connecting | ReadyState::Open);
        self.state = ReadyState::Closed;
        self.reconnect_pending = false;
        self.token = None;
        if was_live {
            vec![StreamAction::Close]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(attempts: u32) -> StreamMachine {
        StreamMachine::new(&StreamConfig {
            reconnect_attempts: attempts,
            reconnect_interval_ms: 5000,
        })
    }

    fn open(m: &mut StreamMachine) {
        m.enable("tok".to_string());
        m.on_open();
    }

    #[test]
    fn test_enable_connects_then_authenticates() {
        let mut m = machine(1);
        assert_eq!(m.state(), ReadyState::Uninstantiated);
        assert_eq!(m.enable("tok".to_string()), vec![StreamAction::Connect]);
        assert_eq!(m.state(), ReadyState::Connecting);
        assert_eq!(m.on_open(), vec![StreamAction::SendAuth("tok".to_string())]);
        assert_eq!(m.state(), ReadyState::Open);
    }

    #[test]
    fn test_enable_twice_is_ignored() {
        let mut m = machine(1);
        m.enable("tok".to_string());
        assert!(m.enable("tok".to_string()).is_empty());
    }

    #[test]
    fn test_message_parsed_only_when_open() {
        let mut m = machine(1);
        assert!(m.on_message("[]").is_none());
        open(&mut m);
        assert_eq!(m.on_message("[]"), Some(vec![]));
        assert!(m.on_message("{\"not\": \"an array\"}").is_none());
        assert!(m.on_message("garbage").is_none());
    }

    #[test]
    fn test_abnormal_close_reconnects_once() {
        let mut m = machine(1);
        open(&mut m);

        assert_eq!(
            m.on_close(Some("going away")),
            vec![StreamAction::ScheduleReconnect(Duration::from_millis(5000))]
        );
        assert_eq!(m.state(), ReadyState::Closed);
        assert_eq!(m.attempts_left(), 0);
        assert_eq!(m.on_reconnect_due(), vec![StreamAction::Connect]);
        assert_eq!(m.state(), ReadyState::Connecting);
        assert!(m.on_reconnect_due().is_empty());
    }

    #[test]
    fn test_successful_reopen_restores_budget() {
        let mut m = machine(1);
        open(&mut m);
        m.on_close(Some("going away"));
        m.on_reconnect_due();
        m.on_open();
        assert_eq!(m.state(), ReadyState::Open);
        assert_eq!(m.attempts_left(), 1);

        assert_eq!(
            m.on_close(Some("going away")),
            vec![StreamAction::ScheduleReconnect(Duration::from_millis(5000))]
        );
        assert_eq!(m.on_reconnect_due(), vec![StreamAction::Connect]);
    }

    #[test]
    fn test_failed_reconnect_is_not_retried() {
        let mut m = machine(1);
        open(&mut m);
        m.on_close(None);
        m.on_reconnect_due();

        assert!(m.on_connect_failed().is_empty());
        assert_eq!(m.state(), ReadyState::Closed);
        assert_eq!(m.attempts_left(), 0);
        assert!(m.on_reconnect_due().is_empty());
    }

    #[test]
    fn test_auth_failure_never_reconnects() {
        let mut m = machine(5);
        open(&mut m);
        assert_eq!(
            m.on_close(Some(AUTH_FAILED_REASON)),
            vec![StreamAction::LoggedOut(AUTH_FAILED_REASON.to_string())]
        );
        assert_eq!(m.attempts_left(), 0);
        assert!(m.on_reconnect_due().is_empty());
    }

    #[test]
    fn test_connect_failure_uses_budget() {
        let mut m = machine(1);
        m.enable("tok".to_string());
        assert_eq!(m.on_connect_failed().len(), 1);
        m.on_reconnect_due();
        assert!(m.on_connect_failed().is_empty());
    }

    #[test]
    fn test_zero_budget_never_reconnects() {
        let mut m = machine(0);
        open(&mut m);
        assert!(m.on_close(None).is_empty());
    }

    #[test]
    fn test_disable_is_not_abnormal() {
        let mut m = machine(1);
        open(&mut m);
        assert_eq!(m.disable(), vec![StreamAction::Close]);
        assert_eq!(m.state(), ReadyState::Closed);
        assert!(m.on_close(None).is_empty());
        assert!(m.on_reconnect_due().is_empty());
    }

    #[test]
    fn test_disable_cancels_pending_reconnect() {
        let mut m = machine(1);
        open(&mut m);
        m.on_close(None);
        assert!(m.disable().is_empty());
        assert!(m.on_reconnect_due().is_empty());
    }

    #[test]
    fn test_reenable_restores_budget() {
        let mut m = machine(1);
        m.enable("tok".to_string());
        m.on_connect_failed();
        m.on_reconnect_due();
        assert!(m.on_connect_failed().is_empty());
        assert_eq!(m.attempts_left(), 0);

        m.enable("tok".to_string());
        assert_eq!(m.attempts_left(), 1);
    }
}
