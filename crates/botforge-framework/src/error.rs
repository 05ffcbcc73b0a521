//! Error types for command dispatch.

use botforge_core::ClientError;
use thiserror::Error;

/// Errors surfaced by [`CommandRouter::dispatch`](crate::router::CommandRouter::dispatch).
///
/// Matching itself never fails; these only come out of running a handler.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The handler returned an error.
    #[error("command '{command}' failed: {message}")]
    Handler {
        /// The full command word, prefix included.
        command: String,
        /// The handler's error, rendered.
        message: String,
    },

    /// Sending the handler's reply failed.
    #[error("failed to send reply: {0}")]
    Reply(#[from] ClientError),
}

/// Result type for command operations.
pub type CommandResult<T> = Result<T, CommandError>;
