//! # Bot Settings
//!
//! Connection configuration loaded once at startup and read-only afterwards.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Environment overrides, handler timeout and registration mode
//! - 1.0.0: JSON settings file with `BotSettings` section

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Settings file read when `BOT_SETTINGS_PATH` is not set
pub const DEFAULT_SETTINGS_PATH: &str = "appsettings.json";

/// Inline handler budget when `HANDLER_TIMEOUT_SECS` is not set
pub const DEFAULT_HANDLER_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read settings file {path}: {reason}")]
    File { path: String, reason: String },
}

/// Where slash commands get registered once the gateway is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMode {
    /// Guild-scoped registration, visible instantly
    Development,
    /// Global registration, may take up to an hour to propagate
    Production,
}

impl BotMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" | "debug" => Some(BotMode::Development),
            "production" | "prod" | "release" => Some(BotMode::Production),
            _ => None,
        }
    }
}

impl Default for BotMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            BotMode::Development
        } else {
            BotMode::Production
        }
    }
}

#[derive(Clone)]
pub struct BotSettings {
    pub token: String,
    pub guild_id: u64,
    pub mode: BotMode,
    pub handler_timeout: Duration,
    pub log_level: String,
}

impl fmt::Debug for BotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSettings")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("mode", &self.mode)
            .field("handler_timeout", &self.handler_timeout)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsDocument {
    #[serde(rename = "BotSettings", default)]
    bot_settings: FileSettings,
}

/// The `BotSettings` section of the JSON settings file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileSettings {
    pub token: Option<String>,
    pub guild_id: Option<IdValue>,
}

/// Guild ids show up both quoted and bare in settings files
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Text(String),
    Number(u64),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        }
    }
}

impl FileSettings {
    /// Parse the settings document, returning only its `BotSettings` section
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let doc: SettingsDocument = serde_json::from_str(raw)?;
        Ok(doc.bot_settings)
    }

    /// Read the settings file; a missing file yields empty settings
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&raw).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl BotSettings {
    /// Load from the settings file and process environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("BOT_SETTINGS_PATH")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
        let file = FileSettings::read(Path::new(&path))?;
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge file settings with environment lookups; the environment wins
    pub fn from_sources<F>(file: FileSettings, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let token = non_empty("DISCORD_TOKEN")
            .or(file.token.filter(|t| !t.trim().is_empty()))
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let raw_guild = non_empty("DISCORD_GUILD_ID")
            .or(file.guild_id.map(IdValue::into_string))
            .ok_or(ConfigError::Missing("DISCORD_GUILD_ID"))?;
        let guild_id = parse_guild_id(&raw_guild)?;

        let mode = match non_empty("BOT_MODE") {
            Some(raw) => BotMode::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "BOT_MODE",
                reason: format!("expected development or production, got '{raw}'"),
            })?,
            None => BotMode::default(),
        };

        let handler_timeout = match non_empty("HANDLER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "HANDLER_TIMEOUT_SECS",
                    reason: format!("'{raw}' is not a number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: "HANDLER_TIMEOUT_SECS",
                        reason: "timeout must be at least one second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HANDLER_TIMEOUT_SECS),
        };

        let log_level = non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(BotSettings {
            token,
            guild_id,
            mode,
            handler_timeout,
            log_level,
        })
    }
}

fn parse_guild_id(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: "DISCORD_GUILD_ID",
            reason: "guild id cannot be zero".to_string(),
        }),
        Ok(id) => Ok(id),
        Err(_) => Err(ConfigError::Invalid {
            key: "DISCORD_GUILD_ID",
            reason: format!("'{raw}' is not a numeric id"),
        }),
    }
}
