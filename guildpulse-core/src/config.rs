//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/guildpulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/guildpulse/` (~/.config/guildpulse/)
//! - Data: `$XDG_DATA_HOME/guildpulse/` (~/.local/share/guildpulse/)
//! - State/Logs: `$XDG_STATE_HOME/guildpulse/` (~/.local/state/guildpulse/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the aggregate store path.
pub const DB_PATH_ENV: &str = "GUILDPULSE_DB_PATH";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Aggregate store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Report defaults
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Aggregate store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite file written by the ingestion pipeline
    pub path: Option<PathBuf>,

    /// Busy timeout applied to every query, in milliseconds
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

fn default_query_timeout_ms() -> u64 {
    5000
}

/// Report defaults
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Lookback window used when the caller does not pass one
    #[serde(default = "default_window_days")]
    pub default_window_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
        }
    }
}

fn default_window_days() -> i64 {
    crate::analytics::DEFAULT_WINDOW_DAYS
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration, returning an error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.store.query_timeout_ms == 0 {
            return Err(Error::Config(
                "store.query_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.report.default_window_days <= 0 {
            return Err(Error::Config(
                "report.default_window_days must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the aggregate store path.
    ///
    /// Precedence: `GUILDPULSE_DB_PATH`, then `store.path`, then the XDG
    /// data directory default.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = std::env::var_os(DB_PATH_ENV) {
            return PathBuf::from(path);
        }
        self.store
            .path
            .clone()
            .unwrap_or_else(Self::default_store_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/guildpulse/config.toml` (~/.config/guildpulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("guildpulse").join("config.toml")
    }

    /// Returns the data directory path
    ///
    /// `$XDG_DATA_HOME/guildpulse/` (~/.local/share/guildpulse/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("guildpulse")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/guildpulse/` (~/.local/state/guildpulse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("guildpulse")
    }

    /// Returns the default aggregate store path
    ///
    /// `$XDG_DATA_HOME/guildpulse/bot.sqlite3`
    pub fn default_store_path() -> PathBuf {
        Self::data_dir().join("bot.sqlite3")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/guildpulse/guildpulse.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("guildpulse.log")
    }
}
