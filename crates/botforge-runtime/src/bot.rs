//! The bot wrapper.
//!
//! A [`Bot`] owns a [`Client`](botforge_core::Client), a [`CommandRouter`]
//! and an [`EventBus`]. Once started it connects the client and processes
//! its events one at a time:
//!
//! | Client event      | Bot reaction                                  |
//! |-------------------|-----------------------------------------------|
//! | `Ready`           | info log, emit `ready`, start taking commands |
//! | `MessageCreate`   | dispatch through the router                   |
//! | `Reconnecting`    | warn log, emit `reconnecting`                 |
//! | `Reconnected`     | warn log, emit `reconnected`                  |
//! | `Close`           | warn log, emit `close`                        |
//! | `Error`           | error log, emit `error`                       |
//!
//! Events are handled sequentially: a slow command handler delays every
//! event behind it.
//!
//! ```rust,ignore
//! let bot = Bot::new(token, overrides, client)?;
//! bot.on(EventKind::Ready, |event| info!(?event, "ready"));
//! bot.add_command("dank", |_args, _ctx| async { "memes" });
//! bot.run().await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::{AppConfig, ConfigError, validate_bot_config, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use botforge_core::{
    BotConfig, BotEvent, BoxedClient, ClientEvent, ConnectOptions, EventBus, EventKind,
    InboundMessage, Subscription,
};
use botforge_framework::{
    BoxedCommandHandler, CommandArgs, CommandContext, CommandResponse, CommandResult,
    CommandRouter, Dispatch,
};

/// Represents the current status of a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotStatus {
    /// Not started yet.
    Idle,
    /// Waiting for the client's ready notification.
    Connecting,
    /// Connected and taking commands.
    Ready,
    /// The client is reconnecting.
    Reconnecting,
    /// The connection closed or the bot was stopped.
    Closed,
}

impl std::fmt::Display for BotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Ready => write!(f, "Ready"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// A chat bot: a client, a command router and an event bus.
pub struct Bot {
    token: String,
    config: RwLock<Arc<BotConfig>>,
    client: BoxedClient,
    router: Arc<CommandRouter>,
    events: EventBus,
    status: RwLock<BotStatus>,
    /// Set by the first `Ready`; messages before that are ignored.
    accepting: AtomicBool,
    running: AtomicBool,
    shutdown: CancellationToken,
}

impl Bot {
    /// Creates a bot from the default config merged with `overrides`.
    pub fn new(
        token: impl Into<String>,
        overrides: Map<String, Value>,
        client: BoxedClient,
    ) -> RuntimeResult<Self> {
        let config = BotConfig::default()
            .merged(&overrides)
            .map_err(ConfigError::from)?;
        Self::with_config(token, config, client)
    }

    /// Creates a bot from a loaded [`AppConfig`], initializing logging first.
    pub fn from_config(
        token: impl Into<String>,
        config: &AppConfig,
        client: BoxedClient,
    ) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        validate_config(config)?;
        Self::with_config(token, config.bot.clone(), client)
    }

    /// Creates a bot from a complete [`BotConfig`].
    pub fn with_config(
        token: impl Into<String>,
        config: BotConfig,
        client: BoxedClient,
    ) -> RuntimeResult<Self> {
        validate_bot_config(&config)?;

        info!(
            name = %config.name,
            prefix = %config.prefix,
            use_compact_encoding = config.use_compact_encoding,
            extra = ?config.extra,
            platform = client.platform(),
            "Running with config"
        );

        let events = EventBus::new();
        let router = Arc::new(CommandRouter::new(config.prefix.clone(), events.clone()));

        Ok(Self {
            token: token.into(),
            config: RwLock::new(Arc::new(config)),
            client,
            router,
            events,
            status: RwLock::new(BotStatus::Idle),
            accepting: AtomicBool::new(false),
            running: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns a snapshot of the current config.
    pub fn config(&self) -> Arc<BotConfig> {
        Arc::clone(&self.config.read())
    }

    /// Returns the command router.
    pub fn router(&self) -> &Arc<CommandRouter> {
        &self.router
    }

    /// Returns the event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the client.
    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Returns the current status.
    pub fn status(&self) -> BotStatus {
        *self.status.read()
    }

    fn set_status(&self, status: BotStatus) {
        let old_status = std::mem::replace(&mut *self.status.write(), status);
        debug!(
            old_status = %old_status,
            new_status = %status,
            "Bot status changed"
        );
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Subscribes to bot events of `kind`.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&BotEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, listener)
    }

    /// Removes a subscription.
    pub fn off(&self, subscription: Subscription) -> bool {
        self.events.off(subscription)
    }

    /// Registers a command handler. Replaces any handler for the same trigger.
    pub fn add_command<F, Fut>(&self, trigger: impl Into<String>, handler: F) -> bool
    where
        F: Fn(CommandArgs, CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: CommandResponse + 'static,
    {
        self.router.add_command(trigger, handler)
    }

    /// Registers a boxed handler. See [`add_command`](Self::add_command).
    pub fn add_handler(&self, trigger: impl Into<String>, handler: BoxedCommandHandler) -> bool {
        self.router.add_handler(trigger, handler)
    }

    /// Merges `overrides` into the current config.
    ///
    /// The merged config is validated before it replaces the current one.
    /// The config and the router's prefix change together under the config
    /// write lock, so a message never sees one without the other.
    pub fn update_config(&self, overrides: &Map<String, Value>) -> RuntimeResult<()> {
        let mut config = self.config.write();
        let merged = Arc::new(config.merged(overrides).map_err(ConfigError::from)?);
        validate_bot_config(&merged)?;

        *config = Arc::clone(&merged);
        self.router.set_prefix(merged.prefix.clone());
        drop(config);

        info!(
            name = %merged.name,
            prefix = %merged.prefix,
            use_compact_encoding = merged.use_compact_encoding,
            "Config updated"
        );
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connects the client and processes its events until the stream ends or
    /// [`stop`](Self::stop) is called.
    pub async fn start(&self) -> RuntimeResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Bot is already running");
            return Err(RuntimeError::AlreadyRunning);
        }

        let result = self.event_loop().await;
        self.set_status(BotStatus::Closed);
        self.running.store(false, Ordering::SeqCst);
        result
    }

    /// Runs the bot until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        info!("Bot is starting. Press Ctrl+C to stop.");
        self.run_until(wait_for_shutdown()).await
    }

    /// Runs the bot until `shutdown` completes or the client's stream ends.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let start = self.start();
        tokio::pin!(start);
        tokio::pin!(shutdown);

        tokio::select! {
            biased;
            result = &mut start => return result,
            _ = &mut shutdown => {}
        }

        self.stop().await;
        start.await
    }

    /// Stops the event loop and closes the client. The bot cannot be restarted.
    pub async fn stop(&self) {
        info!("Stopping bot");
        self.shutdown.cancel();
        self.client.close().await;
    }

    async fn event_loop(&self) -> RuntimeResult<()> {
        let config = self.config();
        let options = ConnectOptions {
            use_compact_encoding: config.use_compact_encoding,
            name: config.name.clone(),
        };

        self.set_status(BotStatus::Connecting);
        info!(platform = self.client.platform(), "Connecting client");
        let mut events = self.client.connect(&self.token, options).await?;

        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, leaving event loop");
                    break;
                }
                event = events.recv() => event,
            };

            let Some(event) = event else {
                info!("Client event stream ended");
                break;
            };
            self.handle_client_event(event).await;
        }

        Ok(())
    }

    async fn handle_client_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::Ready(user) => {
                info!(user = %user, "Bot client is ready");
                self.accepting.store(true, Ordering::SeqCst);
                self.set_status(BotStatus::Ready);
                self.events.emit(&BotEvent::Ready {
                    config: self.config(),
                    user,
                });
            }
            ClientEvent::MessageCreate(message) => {
                if !self.accepting.load(Ordering::SeqCst) {
                    trace!(message_id = %message.id, "Ignoring message received before ready");
                    return;
                }
                if let Err(e) = self.handle_message(message).await {
                    error!(error = %e, "Command failed");
                }
            }
            ClientEvent::Reconnecting => {
                warn!("Client is reconnecting");
                self.set_status(BotStatus::Reconnecting);
                self.events.emit(&BotEvent::Reconnecting);
            }
            ClientEvent::Reconnected => {
                warn!("Client has reconnected");
                self.set_status(BotStatus::Ready);
                self.events.emit(&BotEvent::Reconnected);
            }
            ClientEvent::Close { code, reason } => {
                warn!(code, reason = %reason, "Client connection closed");
                self.set_status(BotStatus::Closed);
                self.events.emit(&BotEvent::Close { code, reason });
            }
            ClientEvent::Error(e) => {
                error!(error = %e, "Client encountered an error");
                self.events.emit(&BotEvent::Error(e));
            }
        }
    }

    /// Dispatches one message through the router with this bot's client and
    /// current config.
    ///
    /// The match and the config snapshot are taken under the same read lock.
    pub async fn handle_message(&self, message: InboundMessage) -> CommandResult<Dispatch> {
        let (matched, config) = {
            let config = self.config.read();
            (self.router.match_command(&message.body), Arc::clone(&config))
        };

        match matched {
            Some(matched) => {
                self.router
                    .run(matched, message, Arc::clone(&self.client), config)
                    .await
            }
            None => {
                trace!(message_id = %message.id, "Message is not a command");
                Ok(Dispatch::NoMatch)
            }
        }
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("status", &self.status())
            .field("platform", &self.client.platform())
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                ctrl_c.await;
                info!("Received Ctrl+C, shutting down");
                return;
            }
        };

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("Received Ctrl+C, shutting down");
    }
}
