//! Runtime configuration.
//!
//! Loaded from the TOML file named by `BAKERY_CONFIG`. Every field has a default,
//! so a missing variable or an empty file yields a working configuration.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the config file path.
pub const CONFIG_ENV: &str = "BAKERY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.message().to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub actors: ActorsConfig,
    pub orders: OrdersConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActorsConfig {
    /// Mailbox capacity of every resource actor.
    pub buffer_size: usize,
}

impl Default for ActorsConfig {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrdersConfig {
    pub number_prefix: String,
    /// How many fresh order numbers to try before giving up on a collision.
    pub number_retry_attempts: u32,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            number_prefix: "CMD-".to_string(),
            number_retry_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub mail_queue_size: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { mail_queue_size: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)?.parse()
    }

    /// Reads the file named by `BAKERY_CONFIG`, or returns the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actors.buffer_size == 0 {
            return Err(ConfigError::Validation("actors.buffer_size must be greater than zero".into()));
        }
        if self.orders.number_prefix.is_empty() {
            return Err(ConfigError::Validation("orders.number_prefix cannot be empty".into()));
        }
        if self.orders.number_retry_attempts == 0 {
            return Err(ConfigError::Validation(
                "orders.number_retry_attempts must be greater than zero".into(),
            ));
        }
        if self.notifications.mail_queue_size == 0 {
            return Err(ConfigError::Validation(
                "notifications.mail_queue_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
