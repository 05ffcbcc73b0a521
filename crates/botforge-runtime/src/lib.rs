//! Botforge Runtime - the bot wrapper, configuration loading and logging.
//!
//! This crate provides:
//! - [`Bot`]: connects a client, forwards its lifecycle events and routes
//!   commands
//! - [`config`]: figment-based loading from defaults, files and the
//!   environment
//! - [`logging`]: `tracing-subscriber` setup driven by the loaded config
//!
//! ```ignore
//! use botforge_runtime::{Bot, config::ConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     let bot = Bot::from_config(token, &config, client)?;
//!
//!     bot.add_command("dank", |_args, _ctx| async { "memes" });
//!
//!     // Run until Ctrl+C
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use bot::{Bot, BotStatus};
pub use config::{AppConfig, BotConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
