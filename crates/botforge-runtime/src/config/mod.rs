//! Configuration module for the Botforge runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for the bot settings and the logging setup.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use botforge_core::BotConfig;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{AppConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig};
pub use validation::{validate_bot_config, validate_config};
