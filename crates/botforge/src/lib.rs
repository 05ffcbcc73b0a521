//! # Botforge
//!
//! A small event-driven chat bot builder: hand it a client and a token, get
//! lifecycle events on a typed bus and prefix commands routed to async
//! handlers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐ ClientEvent ┌─────────┐ BotEvent ┌───────────┐
//! │  Client  │────────────▶│   Bot   │─────────▶│ listeners │
//! │(platform)│◀────────────│(runtime)│          └───────────┘
//! └──────────┘    reply    └────┬────┘
//!                               │ MessageCreate
//!                               ▼
//!                       ┌───────────────┐        ┌──────────┐
//!                       │ CommandRouter │───────▶│ handlers │
//!                       └───────────────┘        └──────────┘
//! ```
//!
//! - **Client**: owns the platform connection (see [`core::Client`])
//! - **Bot**: merges config, forwards lifecycle events, feeds messages to the router
//! - **CommandRouter**: matches `prefix + trigger` against the first word
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use botforge::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bot = Bot::new(token, overrides, client)?;
//!
//!     bot.on(EventKind::Ready, |event| {
//!         if let BotEvent::Ready { user, .. } = event {
//!             info!("Logged in as {user}");
//!         }
//!     });
//!     bot.add_command("dank", |_args, _ctx| async { "memes" });
//!
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `botforge.toml` (default)
//! - `yaml-config`: load `botforge.yaml`
//! - `json-log`: JSON log output
//! - `console`: the terminal client

pub use botforge_core as core;
pub use botforge_framework as framework;
pub use botforge_runtime as runtime;

#[cfg(feature = "console")]
pub use botforge_adapter_console as console;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use botforge::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use botforge_runtime::config::{AppConfig, ConfigLoader};
    pub use botforge_runtime::{Bot, BotStatus, RuntimeError};

    // Events
    pub use botforge_core::{BotEvent, EventKind, Subscription};

    // Commands
    pub use botforge_framework::{CommandArgs, CommandContext, CommandError, Dispatch};

    // Clients
    pub use botforge_core::{BotConfig, BoxedClient, Client, InboundMessage, User};

    // Logging macros
    pub use botforge_runtime::prelude::*;
}
