//! Configuration loader and validator
//!
//! Loads reader settings from TOML files in the configs/ directory.

use crate::nunchuk::{SessionConfig, SessionMode, DEFAULT_ADAPTATION_DELAY_US, MINIMUM_ADAPTATION_DELAY_US};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

/// Reader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// I2C bus number (/dev/i2c-N)
    #[serde(default = "default_bus")]
    pub bus: u8,

    /// Wait after each bus write before reading (microseconds)
    #[serde(default = "default_adaptation_delay")]
    pub adaptation_delay_us: u32,

    /// Initialization mode
    #[serde(default)]
    pub mode: SessionMode,

    /// Time between read cycles (milliseconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Minimum raw change on either joystick axis to report a move
    #[serde(default = "default_joystick_threshold")]
    pub joystick_threshold: u16,

    /// Minimum raw change on any accelerometer axis to report an update
    #[serde(default = "default_accelerometer_threshold")]
    pub accelerometer_threshold: u16,

    /// Stop after this many failed reads in a row (0 = never stop)
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            adaptation_delay_us: default_adaptation_delay(),
            mode: SessionMode::default(),
            poll_interval_ms: default_poll_interval(),
            joystick_threshold: default_joystick_threshold(),
            accelerometer_threshold: default_accelerometer_threshold(),
            max_consecutive_errors: default_max_consecutive_errors(),
        }
    }
}

fn default_bus() -> u8 { 1 }
fn default_adaptation_delay() -> u32 { DEFAULT_ADAPTATION_DELAY_US }
fn default_poll_interval() -> u64 { 20 }
fn default_joystick_threshold() -> u16 { 2 }
fn default_accelerometer_threshold() -> u16 { 8 }
fn default_max_consecutive_errors() -> u32 { 10 }

impl Settings {
    /// Session parameters for the reader
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::with_delay(self.adaptation_delay_us, self.mode)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("Loading configuration from: {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        let config = Self::from_toml(&content)?;

        info!("✓ Config loaded");
        Ok(config)
    }

    /// Load default configuration from configs/default.toml
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load("configs/default.toml")
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;

        debug!("  - Bus: /dev/i2c-{}", config.settings.bus);
        debug!("  - Mode: {}", config.settings.mode);
        debug!("  - Adaptation delay: {}us", config.settings.adaptation_delay_us);
        debug!("  - Poll interval: {}ms", config.settings.poll_interval_ms);

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.adaptation_delay_us < MINIMUM_ADAPTATION_DELAY_US {
            return Err(ConfigError::Invalid(format!(
                "adaptation_delay_us must be at least {}",
                MINIMUM_ADAPTATION_DELAY_US
            )));
        }

        if self.settings.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be positive".into()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.bus, 1);
        assert_eq!(settings.adaptation_delay_us, 500);
        assert_eq!(settings.mode, SessionMode::Plain);
        assert_eq!(settings.poll_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.settings.adaptation_delay_us, 500);
        assert_eq!(config.settings.max_consecutive_errors, 10);
    }

    #[test]
    fn test_valid_config() {
        let config = Config::from_toml(
            r#"
            [settings]
            bus = 0
            adaptation_delay_us = 300
            mode = "obfuscated"
            poll_interval_ms = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.bus, 0);
        assert_eq!(
            config.settings.session_config(),
            SessionConfig::with_delay(300, SessionMode::Obfuscated)
        );
    }

    #[test]
    fn test_delay_below_floor() {
        let result = Config::from_toml("[settings]\nadaptation_delay_us = 299\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert!(result.unwrap_err().to_string().contains("at least 300"));
    }

    #[test]
    fn test_zero_poll_interval() {
        let result = Config::from_toml("[settings]\npoll_interval_ms = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_mode() {
        let result = Config::from_toml("[settings]\nmode = \"rot13\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_mode_aliases_match_from_str() {
        for (text, mode) in [
            ("plain", SessionMode::Plain),
            ("not_encrypted", SessionMode::Plain),
            ("obfuscated", SessionMode::Obfuscated),
            ("encrypted", SessionMode::Obfuscated),
        ] {
            let config = Config::from_toml(&format!("[settings]\nmode = \"{}\"\n", text)).unwrap();
            assert_eq!(config.settings.mode, mode);
            assert_eq!(text.parse::<SessionMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load("configs/does-not-exist.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
