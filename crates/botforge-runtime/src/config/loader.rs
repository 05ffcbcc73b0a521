//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic defaults passed to [`ConfigLoader::merge`]
//! 3. Profile-specific config file (`botforge.{profile}.toml`)
//! 4. Main config file (`botforge.toml` / `config.toml`)
//! 5. Environment variables (`BOTFORGE_*`)
//!
//! TOML files need the `toml-config` feature (on by default), YAML files
//! (`botforge.yaml`, `botforge.yml`) the `yaml-config` feature.
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `BOTFORGE_` prefix with `__` as separator:
//!
//! - `BOTFORGE_BOT__PREFIX=;` → `bot.prefix = ";"`
//! - `BOTFORGE_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//!
//! # Key Aliases
//!
//! `bot.use_etf` and `bot.useCompactEncoding` are rewritten to
//! `bot.use_compact_encoding` inside each source before it is merged, so a
//! higher source always wins regardless of which spelling either one uses.
//!
//! # Example
//!
//! ```rust,ignore
//! use botforge_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/botforge.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::value::{Dict, Map, Value};
use figment::{Figment, Metadata, Provider};
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use botforge_core::config::{COMPACT_ENCODING_ALIASES, COMPACT_ENCODING_KEY};

use super::error::{ConfigError, ConfigResult};
use super::schema::AppConfig;

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `BOTFORGE_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("BOTFORGE_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wraps a provider and canonicalises the `bot` section's alias keys.
struct CanonicalKeys<P>(P);

impl<P: Provider> Provider for CanonicalKeys<P> {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> Result<Map<figment::Profile, Dict>, figment::Error> {
        let mut data = self.0.data()?;
        for dict in data.values_mut() {
            if let Some(Value::Dict(_, bot)) = dict.get_mut("bot") {
                canonicalize_bot_keys(bot);
            }
        }
        Ok(data)
    }

    fn profile(&self) -> Option<figment::Profile> {
        self.0.profile()
    }
}

fn canonicalize_bot_keys(bot: &mut Dict) {
    let mut alias_value = None;
    for alias in COMPACT_ENCODING_ALIASES.iter().rev() {
        if let Some(value) = bot.remove(*alias) {
            alias_value = Some(value);
        }
    }
    if let Some(value) = alias_value {
        bot.insert(COMPACT_ENCODING_KEY.to_string(), value);
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic defaults layered over the built-in ones.
    figment: Figment,
    /// Configuration profile.
    profile: Profile,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load. Loading fails if it is missing.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` over the built-in defaults.
    ///
    /// Files and environment variables still take precedence over it.
    pub fn merge(mut self, config: AppConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<AppConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: AppConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;

        debug!(
            profile = %profile,
            prefix = %config.bot.prefix,
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        if let Some(path) = self.config_file.take() {
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, &path)?;
            } else {
                return Err(ConfigError::FileNotFound(path));
            }
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with BOTFORGE_ prefix");
            figment = figment.merge(CanonicalKeys(Env::prefixed("BOTFORGE_").split("__")));
        }

        Ok(figment)
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(CanonicalKeys(Toml::file(path)))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(CanonicalKeys(Yaml::file(path)))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("botforge"));
        }
        paths
    }

    /// Searches one file format across `search_paths × base_names`.
    ///
    /// A profile-specific variant is merged before its base file. Stops at the
    /// first base file found.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                let profile_path =
                    search_path.join(format!("{stem}.{}.{ext}", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = merge_fn(figment, &profile_path);
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    figment = merge_fn(figment, &base_path);
                    return (figment, true);
                }
            }
        }
        (figment, false)
    }

    /// Searches for and loads configuration files from search paths.
    #[allow(unused_mut)]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["botforge.toml", "config.toml"],
                |fig, path| fig.merge(CanonicalKeys(Toml::file(path))),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["botforge.yaml", "botforge.yml"],
                |fig, path| fig.merge(CanonicalKeys(Yaml::file(path))),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!("No configuration file found, using defaults");
        }
        figment
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap();

            assert_eq!(config.bot.prefix, "!");
            assert!(config.bot.use_compact_encoding);
            assert_eq!(config.logging.level.as_str(), "info");
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        Jail::expect_with(|jail| {
            let result = ConfigLoader::new()
                .file(jail.directory().join("nope.toml"))
                .without_env()
                .load();
            assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
            Ok(())
        });
    }

    #[test]
    fn test_programmatic_defaults() {
        Jail::expect_with(|jail| {
            let mut defaults = AppConfig::default();
            defaults.bot.prefix = ";".to_string();

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .merge(defaults)
                .load()
                .unwrap();

            assert_eq!(config.bot.prefix, ";");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("BOTFORGE_BOT__PREFIX", "?");
            jail.set_env("BOTFORGE_LOGGING__LEVEL", "debug");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .unwrap();

            assert_eq!(config.bot.prefix, "?");
            assert_eq!(config.logging.level.as_str(), "debug");
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_overrides_programmatic_defaults_and_keeps_extra_keys() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "botforge.toml",
                r#"
                [bot]
                prefix = "$"
                use_etf = false
                owner = "alice"
                "#,
            )?;

            let mut defaults = AppConfig::default();
            defaults.bot.prefix = ";".to_string();
            defaults.bot.name = "Dank Bot".to_string();

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .merge(defaults)
                .load()
                .unwrap();

            assert_eq!(config.bot.prefix, "$");
            assert_eq!(config.bot.name, "Dank Bot");
            assert!(!config.bot.use_compact_encoding);
            assert_eq!(
                config.bot.extra("owner").and_then(|v| v.as_str()),
                Some("alice")
            );
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_profile_file_is_loaded_before_base_file() {
        Jail::expect_with(|jail| {
            jail.create_file("botforge.production.toml", "[bot]\nname = \"Prod\"\nprefix = \"p\"")?;
            jail.create_file("botforge.toml", "[bot]\nprefix = \"b\"")?;

            let config = ConfigLoader::new()
                .profile("prod")
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap();

            assert_eq!(config.bot.name, "Prod");
            assert_eq!(config.bot.prefix, "b");
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_canonical_key_in_higher_file_beats_alias_in_lower_file() {
        Jail::expect_with(|jail| {
            jail.create_file("botforge.development.toml", "[bot]\nuse_etf = false")?;
            jail.create_file("botforge.toml", "[bot]\nuse_compact_encoding = true")?;

            let config = ConfigLoader::new()
                .profile("development")
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap();

            assert!(config.bot.use_compact_encoding);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_env_canonical_key_beats_file_alias() {
        Jail::expect_with(|jail| {
            jail.create_file("botforge.toml", "[bot]\nuseCompactEncoding = false")?;
            jail.set_env("BOTFORGE_BOT__USE_COMPACT_ENCODING", "true");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .unwrap();

            assert!(config.bot.use_compact_encoding);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_env_alias_beats_file_canonical_key() {
        Jail::expect_with(|jail| {
            jail.create_file("botforge.toml", "[bot]\nuse_compact_encoding = true")?;
            jail.set_env("BOTFORGE_BOT__USE_ETF", "false");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .unwrap();

            assert!(!config.bot.use_compact_encoding);
            Ok(())
        });
    }

    #[test]
    fn test_alias_beats_canonical_key_within_one_source() {
        let mut bot = Dict::new();
        bot.insert("use_compact_encoding".into(), Value::from(true));
        bot.insert("useCompactEncoding".into(), Value::from(true));
        bot.insert("use_etf".into(), Value::from(false));

        canonicalize_bot_keys(&mut bot);

        assert_eq!(bot.len(), 1);
        assert_eq!(bot.get("use_compact_encoding"), Some(&Value::from(false)));
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("PROD"), Profile::Production);
        assert_eq!(Profile::parse("dev"), Profile::Development);
        assert_eq!(Profile::parse("staging"), Profile::Custom("staging".into()));
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("BOTFORGE_PROFILE", "production");
            assert_eq!(Profile::from_env(), Profile::Production);
            Ok(())
        });
    }
}
