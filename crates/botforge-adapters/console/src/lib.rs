//! Console client for Botforge.
//!
//! Turns a terminal into a one-channel chat: each line typed is a message
//! from the console user, and the bot's replies are printed back. Useful for
//! trying out commands without a chat platform account.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use botforge_adapter_console::ConsoleClient;
//!
//! let client = Arc::new(ConsoleClient::new());
//! let bot = Bot::new(token, overrides, client)?;
//! bot.run().await?;
//! ```

mod client;

pub use client::{ABNORMAL_CLOSURE, ConsoleClient, ConsoleClientBuilder, NORMAL_CLOSURE};
