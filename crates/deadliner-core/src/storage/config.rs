//! TOML-based application configuration.
//!
//! Stores user preferences for the monitor loop and notifications.
//! Configuration is stored at `~/.config/deadliner/config.toml`; missing
//! files and missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

fn default_true() -> bool {
    true
}

fn default_tick_secs() -> u64 {
    5
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Monitor-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between scheduler ticks in `watch`.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/deadliner/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load the configuration, falling back to defaults if the file does
    /// not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.notifications.enabled);
        assert_eq!(config.monitor.tick_secs, 5);
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let config: Config = toml::from_str("[monitor]\ntick_secs = 30\n").unwrap();
        assert_eq!(config.monitor.tick_secs, 30);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut config = Config::default();
        config.notifications.enabled = false;
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert!(!back.notifications.enabled);
    }
}
