//! Configuration management
//!
//! This module handles loading and parsing configuration for the table timer.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults. The dining
//! window length and the warning thresholds are fixed and not configurable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Key-value store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Staff login configuration
    #[serde(default)]
    pub admin: AdminConfig,
    /// Polling intervals
    #[serde(default)]
    pub timers: TimerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin embedded in customer locators (what the QR code points at)
    #[serde(default = "default_public_origin")]
    pub public_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_origin: default_public_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_origin() -> String {
    "http://localhost:8080".to_string()
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store driver (file or memory)
    #[serde(default)]
    pub driver: StoreDriver,
    /// Path of the JSON file used by the file driver
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            driver: StoreDriver::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/tabletimer.json")
}

/// Store driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreDriver {
    /// Single JSON file on disk (default)
    #[default]
    File,
    /// Process memory, lost on restart
    Memory,
}

/// Staff login configuration
///
/// These are demo credentials checked in plain text; they are not a
/// security boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "restaurant123".to_string()
}

/// Polling intervals for the console and customer pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Console tick driving expiry notifications, in milliseconds
    #[serde(default = "default_console_tick_ms")]
    pub console_tick_ms: u64,
    /// How often the customer page re-fetches its session, in seconds
    #[serde(default = "default_customer_refresh_seconds")]
    pub customer_refresh_seconds: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            console_tick_ms: default_console_tick_ms(),
            customer_refresh_seconds: default_customer_refresh_seconds(),
        }
    }
}

fn default_console_tick_ms() -> u64 {
    1000
}

fn default_customer_refresh_seconds() -> u64 {
    30
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - TABLETIMER_SERVER_HOST
    /// - TABLETIMER_SERVER_PORT
    /// - TABLETIMER_SERVER_PUBLIC_ORIGIN
    /// - TABLETIMER_STORE_DRIVER
    /// - TABLETIMER_STORE_PATH
    /// - TABLETIMER_ADMIN_USERNAME
    /// - TABLETIMER_ADMIN_PASSWORD
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must not be 0".into()));
        }
        if self.server.public_origin.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.public_origin must not be empty".into(),
            ));
        }
        if self.admin.username.is_empty() || self.admin.password.is_empty() {
            return Err(ConfigError::ValidationError(
                "admin credentials must not be empty".into(),
            ));
        }
        if self.timers.console_tick_ms == 0 || self.timers.customer_refresh_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "timer intervals must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TABLETIMER_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TABLETIMER_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("TABLETIMER_SERVER_PUBLIC_ORIGIN") {
            self.server.public_origin = origin;
        }

        if let Ok(driver) = std::env::var("TABLETIMER_STORE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "file" => self.store.driver = StoreDriver::File,
                "memory" => self.store.driver = StoreDriver::Memory,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(path) = std::env::var("TABLETIMER_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }

        if let Ok(username) = std::env::var("TABLETIMER_ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Ok(password) = std::env::var("TABLETIMER_ADMIN_PASSWORD") {
            self.admin.password = password;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
