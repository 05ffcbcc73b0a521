//! Configuration validation utilities.

use botforge_core::BotConfig;

use super::error::{ConfigError, ConfigResult};
use super::schema::{AppConfig, LogFormat, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &AppConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates bot settings.
pub fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.prefix.is_empty() {
        return Err(ConfigError::missing_field("bot.prefix"));
    }

    // Command words are whitespace-delimited tokens.
    if bot.prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Prefix cannot contain whitespace: {:?}",
            bot.prefix
        )));
    }

    if bot.name.trim().is_empty() {
        return Err(ConfigError::missing_field("bot.name"));
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "JSON log format requires the `json-log` feature",
        ));
    }

    Ok(())
}
