//! Runtime error types.

use thiserror::Error;

pub use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The configuration is invalid or could not be merged.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The client failed to connect.
    #[error("Client error: {0}")]
    Client(#[from] botforge_core::ClientError),

    /// `start` was called while the bot was already running.
    #[error("Bot is already running")]
    AlreadyRunning,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
