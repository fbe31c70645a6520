//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::{APP_BINARY_NAME, CONFIG_DIR_ENV, CONFIG_DIR_NAME};
use crate::models::{ClockFormat, CycleInterval, DEFAULT_WIDTH};
use crate::scheduler::SchedulerSettings;

/// Largest display the control API will drive.
pub const MAX_WIDTH: usize = 64;

/// Display geometry and mode preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Module count, used until the device reports its own.
    pub width: usize,
    /// Clock mode template.
    pub clock_format: ClockFormat,
    /// Time between airports in airport cycling mode.
    pub airport_interval: CycleInterval,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            clock_format: ClockFormat::default(),
            airport_interval: CycleInterval::default(),
        }
    }
}

/// Which transport carries display text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Device REST API.
    #[default]
    Http,
    /// MQTT broker topic.
    Mqtt,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Mqtt => write!(f, "mqtt"),
        }
    }
}

/// MQTT broker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name or IP.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Topic the display subscribes to.
    pub topic: String,
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Optional user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Optional password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            topic: "splitflap/text".to_string(),
            client_id: APP_BINARY_NAME.to_string(),
            username: None,
            password: None,
        }
    }
}

impl MqttConfig {
    /// User name and password, when both are set and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Display sink selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Transport kind.
    pub kind: SinkKind,
    /// Device address for the HTTP sink (IP, host or URL).
    pub device_url: String,
    /// Broker settings for the MQTT sink.
    pub mqtt: MqttConfig,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            device_url: "192.168.1.50".to_string(),
            mqtt: MqttConfig::default(),
        }
    }
}

/// Control API listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/SplitflapControl/config.toml`
/// - macOS: `~/Library/Application Support/SplitflapControl/config.toml`
/// - Windows: `%APPDATA%\SplitflapControl\config.toml`
///
/// `SPLITFLAP_CONFIG_DIR` replaces the directory.
///
/// # Validation
///
/// - `display.width` must be between 1 and 64
/// - `sink.mqtt.topic` must be non-empty and free of `#` and `+` wildcards
/// - `sink.mqtt.host` must be non-empty
/// - `server.port` must be non-zero
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display preferences
    pub display: DisplayConfig,
    /// Display transport
    pub sink: SinkConfig,
    /// Control API listener
    pub server: ServerConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    ///
    /// Honors `SPLITFLAP_CONFIG_DIR`, otherwise:
    /// - Linux: `~/.config/SplitflapControl/`
    /// - macOS: `~/Library/Application Support/SplitflapControl/`
    /// - Windows: `%APPDATA%\SplitflapControl\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit path.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        // Ensure config directory exists
        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let width = self.display.width;
        if width == 0 || width > MAX_WIDTH {
            anyhow::bail!("Display width must be between 1 and {MAX_WIDTH}, got {width}");
        }

        let mqtt = &self.sink.mqtt;
        if mqtt.topic.trim().is_empty() {
            anyhow::bail!("MQTT topic must not be empty");
        }
        if mqtt.topic.contains(['#', '+']) {
            anyhow::bail!(
                "MQTT topic '{}' must not contain wildcards (# or +)",
                mqtt.topic
            );
        }
        if mqtt.host.trim().is_empty() {
            anyhow::bail!("MQTT host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be non-zero");
        }

        Ok(())
    }

    /// Module count to drive, given what the device reported.
    ///
    /// A missing or zero count falls back to the configured width; counts
    /// above [`MAX_WIDTH`] are clamped.
    #[must_use]
    pub fn resolve_width(&self, reported: Option<usize>) -> usize {
        let width = reported
            .filter(|&m| m > 0)
            .unwrap_or(self.display.width);
        if width > MAX_WIDTH {
            warn!(
                "Display reports {} modules; driving only the first {}",
                width, MAX_WIDTH
            );
            return MAX_WIDTH;
        }
        width
    }

    /// Scheduler settings derived from this config, sized to `width` modules.
    #[must_use]
    pub fn scheduler_settings(&self, width: usize) -> SchedulerSettings {
        SchedulerSettings {
            width,
            clock_format: self.display.clock_format,
            airport_interval: self.display.airport_interval,
            ..SchedulerSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.display.width, 6);
        assert_eq!(config.display.airport_interval, CycleInterval::TwoMinutes);
        assert_eq!(config.sink.kind, SinkKind::Http);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:3030");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_width() {
        let mut config = Config::new();
        config.display.width = 0;
        assert!(config.validate().is_err());

        config.display.width = MAX_WIDTH + 1;
        assert!(config.validate().is_err());

        config.display.width = MAX_WIDTH;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_mqtt() {
        let mut config = Config::new();
        config.sink.mqtt.topic = "splitflap/#".to_string();
        assert!(config.validate().is_err());

        config.sink.mqtt.topic = "splitflap/+/text".to_string();
        assert!(config.validate().is_err());

        config.sink.mqtt.topic = "  ".to_string();
        assert!(config.validate().is_err());

        config.sink.mqtt.topic = "flap".to_string();
        config.sink.mqtt.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_server_port() {
        let mut config = Config::new();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.display.width = 8;
        config.display.clock_format = ClockFormat::TwelveHour;
        config.display.airport_interval = CycleInterval::FifteenMinutes;
        config.sink.kind = SinkKind::Mqtt;
        config.sink.mqtt.username = Some("flap".to_string());
        config.sink.mqtt.password = Some("secret".to_string());

        config.save_to(&config_file).unwrap();
        assert!(!config_file.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(loaded, Config::new());
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(
            &config_file,
            "[display]\nairport_interval = \"30m\"\n\n[sink]\nkind = \"mqtt\"\n",
        )
        .unwrap();

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded.display.width, 6);
        assert_eq!(loaded.display.airport_interval, CycleInterval::ThirtyMinutes);
        assert_eq!(loaded.sink.kind, SinkKind::Mqtt);
        assert_eq!(loaded.sink.mqtt.port, 1883);
    }

    #[test]
    fn test_config_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[display]\nwidth = 0\n").unwrap();
        assert!(Config::load_from(&config_file).is_err());
    }

    #[test]
    fn test_save_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        let mut config = Config::new();
        config.server.port = 0;

        assert!(config.save_to(&config_file).is_err());
        assert!(!config_file.exists());
    }

    #[test]
    fn test_mqtt_credentials_need_user_name() {
        let mut mqtt = MqttConfig::default();
        assert!(mqtt.credentials().is_none());

        mqtt.username = Some(String::new());
        mqtt.password = Some("x".to_string());
        assert!(mqtt.credentials().is_none());

        mqtt.username = Some("flap".to_string());
        assert_eq!(mqtt.credentials(), Some(("flap", "x")));
    }

    #[test]
    fn test_scheduler_settings_use_display_preferences() {
        let mut config = Config::new();
        config.display.clock_format = ClockFormat::HourMinuteSecond;
        let settings = config.scheduler_settings(12);
        assert_eq!(settings.width, 12);
        assert_eq!(settings.clock_format, ClockFormat::HourMinuteSecond);
    }

    #[test]
    fn test_resolve_width_falls_back_and_clamps() {
        let mut config = Config::new();
        config.display.width = 8;

        assert_eq!(config.resolve_width(Some(12)), 12);
        assert_eq!(config.resolve_width(None), 8);
        assert_eq!(config.resolve_width(Some(0)), 8);
        assert_eq!(config.resolve_width(Some(100_000)), MAX_WIDTH);
    }
}
