use thiserror::Error;

/// Errors from the live stream transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Could not open the websocket.
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to send frame: {0}")]
    Send(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Live mode needs a session token.
    #[error("No session token available for the live stream")]
    MissingToken,
}
