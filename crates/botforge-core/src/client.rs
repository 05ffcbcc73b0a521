//! The chat-platform client seam.
//!
//! A [`Client`] is the external collaborator that owns the connection to a
//! chat platform: transport, authentication, reconnection and rate limiting
//! all live behind it. The runtime only ever:
//!
//! - connects it with a token and receives a stream of [`ClientEvent`]s,
//! - asks it to reply to a message,
//! - closes it on shutdown.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{ClientError, ClientResult};
use crate::message::{InboundMessage, User};

/// Notifications produced by a connected client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The session is established; carries the bot's own account.
    Ready(User),
    /// A chat message was received.
    MessageCreate(InboundMessage),
    /// The connection dropped and the client is reconnecting.
    Reconnecting,
    /// The client reconnected.
    Reconnected,
    /// The connection was closed.
    Close {
        /// Close code reported by the platform.
        code: u16,
        /// Human-readable reason.
        reason: String,
    },
    /// A transport-level error that did not terminate the stream.
    Error(ClientError),
}

/// Receiving half of a client's event stream.
///
/// The stream ends when the client is closed or the connection is gone for
/// good.
pub type ClientEvents = mpsc::Receiver<ClientEvent>;

/// Options passed to [`Client::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Use the platform's compact wire encoding when available.
    pub use_compact_encoding: bool,
    /// Display name configured for the bot.
    pub name: String,
}

/// The chat-platform client trait.
///
/// Implementations are expected to be cheap to share behind an `Arc`; all
/// methods take `&self`.
#[async_trait]
pub trait Client: Send + Sync + 'static {
    /// Returns a short name for the platform (used in logs).
    fn platform(&self) -> &'static str;

    /// Authenticates with `token` and starts delivering events.
    async fn connect(&self, token: &str, options: ConnectOptions) -> ClientResult<ClientEvents>;

    /// Replies to `message` with `content`.
    ///
    /// Returns the identifier of the sent message.
    async fn reply(&self, message: &InboundMessage, content: &str) -> ClientResult<String>;

    /// Closes the connection. Ends the event stream.
    ///
    /// The default implementation does nothing.
    async fn close(&self) {}
}

/// A shared client trait object.
pub type BoxedClient = Arc<dyn Client>;
