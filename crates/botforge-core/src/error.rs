//! Unified error types for the Botforge core.
//!
//! Framework-level errors (like `CommandError`) are defined in
//! `botforge-framework`, configuration and runtime errors in
//! `botforge-runtime`.

use thiserror::Error;

// =============================================================================
// Client Errors
// =============================================================================

/// Errors reported by a chat-platform [`Client`](crate::client::Client).
///
/// The type is `Clone` so that it can travel inside
/// [`BotEvent::Error`](crate::event::BotEvent::Error) to every listener.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The platform rejected the token.
    #[error("authentication failed: {reason}")]
    Authentication {
        /// Reason for failure.
        reason: String,
    },

    /// Connecting to the platform failed.
    #[error("connection failed: {reason}")]
    ConnectionFailed {
        /// Reason for failure.
        reason: String,
    },

    /// The connection is already closed.
    #[error("connection closed: {reason}")]
    Closed {
        /// Reason for closure.
        reason: String,
    },

    /// Sending a message failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Creates an authentication error.
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Creates a connection-closed error.
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::Closed {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
