//! Configuration management for Godrop.
//!
//! This module handles loading, saving, and managing Godrop configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/godrop/config.toml` |
//! | macOS | `~/Library/Application Support/com.godrop.Godrop/config.toml` |
//! | Windows | `%APPDATA%\godrop\Godrop\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use godrop_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Default port: {}", config.session.port);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for Godrop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session defaults
    pub session: SessionDefaults,
    /// Clipboard settings
    pub clipboard: ClipboardConfig,
    /// Detached viewer settings
    pub viewer: ViewerConfig,
    /// File browser settings
    pub browser: BrowserConfig,
}

/// Defaults used to pre-fill a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    /// Preferred port; the transfer service may pick the next free one
    pub port: u16,
    /// Downloads allowed before a send session shuts down
    pub download_limit: u32,
    /// Minutes until a send session expires (0 for no expiry)
    pub timeout_minutes: u32,
    /// Dropzone override; the backend's default save location is used when unset
    pub save_location: Option<PathBuf>,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            download_limit: crate::DEFAULT_DOWNLOAD_LIMIT,
            timeout_minutes: crate::DEFAULT_TIMEOUT_MINUTES,
            save_location: None,
        }
    }
}

/// Clipboard configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// How often the system clipboard is read while clipboard mode is idle
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Detached viewer configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Interval between `/api/stats` polls
    #[serde(with = "humantime_serde")]
    pub stats_interval: Duration,
    /// Interval between countdown redraws
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            stats_interval: Duration::from_secs(5),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// File browser configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Directory opened at startup instead of the home directory
    pub start_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Reject values the session controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.clipboard.poll_interval.is_zero() {
            return Err(Error::InvalidConfig {
                key: "clipboard.poll_interval".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.viewer.stats_interval.is_zero() || self.viewer.tick_interval.is_zero() {
            return Err(Error::InvalidConfig {
                key: "viewer".to_string(),
                reason: "intervals must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "godrop", "Godrop")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.strip_suffix('s')
            .map(|secs| {
                secs.parse()
                    .map(Duration::from_secs)
                    .map_err(serde::de::Error::custom)
            })
            .or_else(|| {
                s.strip_suffix('m').map(|mins| {
                    mins.parse::<u64>()
                        .map(|m| Duration::from_secs(m * 60))
                        .map_err(serde::de::Error::custom)
                })
            })
            .unwrap_or_else(|| Err(serde::de::Error::custom("invalid duration format")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.session.port, crate::DEFAULT_PORT);
        assert_eq!(config.session.download_limit, 1);
        assert_eq!(config.session.timeout_minutes, 10);
        assert_eq!(config.clipboard.poll_interval, Duration::from_secs(2));
        assert_eq!(config.viewer.stats_interval, Duration::from_secs(5));
        assert_eq!(config.viewer.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config").join("config.toml");

        let mut original = Config::default();
        original.session.port = 8080;
        original.session.save_location = Some(PathBuf::from("/tmp/drop"));
        original.clipboard.poll_interval = Duration::from_secs(3);
        original.save_to(&config_path).unwrap();

        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded.session.port, 8080);
        assert_eq!(
            loaded.session.save_location,
            Some(PathBuf::from("/tmp/drop"))
        );
        assert_eq!(loaded.clipboard.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_config_deserialization_partial() {
        let partial_toml = r#"
[session]
timeout_minutes = 0

[viewer]
stats_interval = "1m"
"#;

        let config: Config = toml::from_str(partial_toml).expect("parse partial config");

        assert_eq!(config.session.timeout_minutes, 0);
        assert_eq!(config.session.port, crate::DEFAULT_PORT);
        assert_eq!(config.viewer.stats_interval, Duration::from_secs(60));
        assert_eq!(config.viewer.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.session.port, crate::DEFAULT_PORT);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[clipboard]\npoll_interval = \"0s\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(
            path.ends_with("config.toml"),
            "Config path should end with config.toml"
        );
    }

    #[test]
    fn test_humantime_duration_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");

        assert!(toml_str.contains("poll_interval = \"2s\""));
        assert!(toml_str.contains("[session]"));
    }
}
