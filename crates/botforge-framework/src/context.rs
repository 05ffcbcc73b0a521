//! Routing context handed to command handlers.

use std::fmt;
use std::sync::Arc;

use botforge_core::{BotConfig, BoxedClient, ClientResult, EventBus, InboundMessage, User};

/// Everything a command handler can reach besides its arguments.
///
/// Cheap to clone: all fields are shared.
#[derive(Clone)]
pub struct CommandContext {
    command: String,
    message: Arc<InboundMessage>,
    client: BoxedClient,
    config: Arc<BotConfig>,
    events: EventBus,
}

impl CommandContext {
    /// Creates a new context.
    pub fn new(
        command: impl Into<String>,
        message: Arc<InboundMessage>,
        client: BoxedClient,
        config: Arc<BotConfig>,
        events: EventBus,
    ) -> Self {
        Self {
            command: command.into(),
            message,
            client,
            config,
            events,
        }
    }

    /// The full command word that matched, prefix included.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The message that invoked the command.
    pub fn message(&self) -> &InboundMessage {
        &self.message
    }

    /// Shortcut for `self.message().author`.
    pub fn author(&self) -> &User {
        &self.message.author
    }

    /// The client that delivered the message.
    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// The bot config in effect when the message was dispatched.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The bot's event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Replies to the invoking message.
    pub async fn reply(&self, content: &str) -> ClientResult<String> {
        self.client.reply(&self.message, content).await
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command)
            .field("message", &self.message)
            .field("platform", &self.client.platform())
            .finish_non_exhaustive()
    }
}
