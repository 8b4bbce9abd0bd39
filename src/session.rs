//! Bearer token holder and logged-out notification.

use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedOut {
    pub reason: String,
}

/// Shared session handle.
///
/// The engine reads the token from here and reports authentication failures
/// through [`Session::log_out`]; whoever owns the login flow subscribes.
#[derive(Debug, Clone)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
    logged_out: broadcast::Sender<LoggedOut>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let (logged_out, _) = broadcast::channel(16);
        Self {
            token: Arc::new(RwLock::new(token.filter(|t| !t.is_empty()))),
            logged_out,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token).filter(|t| !t.is_empty());
        }
    }

    /// Drop the token and notify subscribers.
    pub fn log_out(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
        tracing::warn!(%reason, "Session logged out");
        // No subscribers is fine
        let _ = self.logged_out.send(LoggedOut { reason });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoggedOut> {
        self.logged_out.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}
