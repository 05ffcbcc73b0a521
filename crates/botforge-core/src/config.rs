//! Bot configuration shared by the router, the runtime and the clients.
//!
//! [`BotConfig`] keeps every key it is given: the recognised ones become
//! typed fields and the rest stay in [`BotConfig::extra`] untouched, so a
//! config can be merged repeatedly without losing anything.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical key for the compact-encoding flag.
pub const COMPACT_ENCODING_KEY: &str = "use_compact_encoding";

/// Alternative spellings accepted for the compact-encoding flag, strongest
/// first. Within one source an alias beats the canonical key.
pub const COMPACT_ENCODING_ALIASES: [&str; 2] = ["use_etf", "useCompactEncoding"];

/// Bot-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBotConfig")]
pub struct BotConfig {
    /// String prepended to every trigger to form a command word.
    pub prefix: String,

    /// Ask the client for its compact wire encoding, if it has one.
    pub use_compact_encoding: bool,

    /// Display name of the bot.
    pub name: String,

    /// Unrecognised keys, retained but unused.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            use_compact_encoding: true,
            name: default_name(),
            extra: Map::new(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_name() -> String {
    "Botforge Bot".to_string()
}

impl BotConfig {
    /// Returns a copy of this config with `overrides` applied on top.
    ///
    /// The merge is right-biased and shallow: a key present in `overrides`
    /// replaces the current value, every other key is kept as is.
    pub fn merged(&self, overrides: &Map<String, Value>) -> serde_json::Result<Self> {
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        for (key, value) in overrides {
            if canonical_key(key) == key {
                merged.insert(key.clone(), value.clone());
            }
        }
        for alias in COMPACT_ENCODING_ALIASES.iter().rev() {
            if let Some(value) = overrides.get(*alias) {
                merged.insert(COMPACT_ENCODING_KEY.to_string(), value.clone());
            }
        }

        serde_json::from_value(Value::Object(merged))
    }

    /// Looks up an unrecognised key.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Maps an alias to its canonical key; other keys are returned unchanged.
pub fn canonical_key(key: &str) -> &str {
    if COMPACT_ENCODING_ALIASES.contains(&key) {
        COMPACT_ENCODING_KEY
    } else {
        key
    }
}

/// Wire shape of [`BotConfig`], accepting every spelling of each key.
#[derive(Deserialize)]
struct RawBotConfig {
    prefix: Option<String>,
    use_compact_encoding: Option<bool>,
    use_etf: Option<bool>,
    #[serde(rename = "useCompactEncoding")]
    use_compact_encoding_camel: Option<bool>,
    name: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawBotConfig> for BotConfig {
    fn from(raw: RawBotConfig) -> Self {
        // Aliases win: layered sources always carry the canonical default.
        let use_compact_encoding = raw
            .use_etf
            .or(raw.use_compact_encoding_camel)
            .or(raw.use_compact_encoding)
            .unwrap_or(true);

        Self {
            prefix: raw.prefix.unwrap_or_else(default_prefix),
            use_compact_encoding,
            name: raw.name.unwrap_or_else(default_name),
            extra: raw.extra,
        }
    }
}
