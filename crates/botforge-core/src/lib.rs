//! # Botforge Core
//!
//! The foundation types of the Botforge bot builder.
//!
//! - **Messages**: [`User`] and [`InboundMessage`], produced by a client
//! - **Configuration**: [`BotConfig`] with right-biased merging
//! - **Client seam**: the [`Client`] trait and its [`ClientEvent`] stream
//! - **Event bus**: typed [`BotEvent`]s with [`Subscription`] handles
//!
//! ```text
//! ┌──────────┐ ClientEvent ┌─────────┐  dispatch  ┌───────────────┐
//! │  Client  │────────────▶│   Bot   │───────────▶│ CommandRouter │
//! └──────────┘             └─────────┘            └───────────────┘
//!                               │ BotEvent               │
//!                               ▼                        ▼
//!                          ┌──────────┐ ◀──── command-triggered
//!                          │ EventBus │
//!                          └──────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod message;

pub use client::{BoxedClient, Client, ClientEvent, ClientEvents, ConnectOptions};
pub use config::BotConfig;
pub use error::{ClientError, ClientResult};
pub use event::{BotEvent, EventBus, EventKind, Listener, Subscription};
pub use message::{InboundMessage, User};
