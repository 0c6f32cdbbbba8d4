//! Configuration management for the relay
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer built-in defaults, an optional
//! `signal-relay.toml` file, environment variables and command-line flags.
//!
//! The bot credential and chat id ship with placeholder defaults that must be
//! overridden in any real deployment.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "signal-relay.toml";
/// Prefix for nested environment overrides, e.g. `SIGNAL_RELAY_TELEGRAM__CHAT_ID`.
pub const ENV_PREFIX: &str = "SIGNAL_RELAY_";
pub const PLACEHOLDER_BOT_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";
pub const PLACEHOLDER_CHAT_ID: &str = "YOUR_CHAT_ID_HERE";

/// Un-prefixed environment variables understood for existing deployments.
const LEGACY_ENV: [(&str, &str); 3] = [
    ("TELEGRAM_BOT_TOKEN", "telegram.bot_token"),
    ("TELEGRAM_CHAT_ID", "telegram.chat_id"),
    ("PORT", "server.port"),
];

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the HTTP listener.
    pub server: ServerConfig,
    /// Configuration for the outbound Telegram bot API.
    pub telegram: TelegramConfig,
    /// Configuration for the Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Configuration for Telegram delivery.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct TelegramConfig {
    /// The bot credential, embedded in the API path.
    #[serde(deserialize_with = "string_or_number")]
    pub bot_token: String,
    /// The destination chat. Numeric ids from the environment are kept as text.
    #[serde(deserialize_with = "string_or_number")]
    pub chat_id: String,
    /// Base URL of the bot API, without the `/bot<token>` suffix.
    pub api_base_url: String,
    /// Request timeout for a single `sendMessage` call.
    pub timeout_seconds: u64,
    /// Markup mode sent with every message.
    pub parse_mode: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct MetricsConfig {
    /// Install a Prometheus recorder and serve `GET /metrics`.
    pub enabled: bool,
}

impl Config {
    /// Loads the application configuration.
    ///
    /// Sources are merged in increasing priority: defaults, the TOML file,
    /// legacy environment variables, `SIGNAL_RELAY_*` variables, then `cli`.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::raw().filter_map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                    .map(|(_, path)| (*path).into())
            }))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }

    /// Returns the names of credentials still set to their placeholder value.
    pub fn placeholder_credentials(&self) -> Vec<&'static str> {
        let mut placeholders = Vec::new();
        if self.telegram.bot_token == PLACEHOLDER_BOT_TOKEN {
            placeholders.push("telegram.bot_token");
        }
        if self.telegram.chat_id == PLACEHOLDER_CHAT_ID {
            placeholders.push("telegram.chat_id");
        }
        placeholders
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            telegram: TelegramConfig {
                bot_token: PLACEHOLDER_BOT_TOKEN.to_string(),
                chat_id: PLACEHOLDER_CHAT_ID.to_string(),
                api_base_url: "https://api.telegram.org".to_string(),
                timeout_seconds: 10,
                parse_mode: "HTML".to_string(),
            },
            metrics: MetricsConfig::default(),
        }
    }
}

/// Accepts a string or a bare number. Environment values such as
/// `TELEGRAM_CHAT_ID=-1001234` arrive as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stringly {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(match Stringly::deserialize(deserializer)? {
        Stringly::Text(s) => s,
        Stringly::Signed(n) => n.to_string(),
        Stringly::Unsigned(n) => n.to_string(),
        Stringly::Float(n) => n.to_string(),
    })
}
