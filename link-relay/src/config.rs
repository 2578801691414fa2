//! Configuration loading for pairlink-relay.
//!
//! Configuration is loaded from a TOML file. Every section and field is
//! optional and falls back to its default.

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration for the relay backends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Queue storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Receive configuration.
    #[serde(default)]
    pub receive: ReceiveConfig,
    /// Push notification configuration.
    #[serde(default)]
    pub push: PushConfig,
    /// Cleanup task configuration.
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

/// Queue storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: PathBuf,
    /// Maximum transit-encoded payload size in bytes (default: 256 KiB).
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,
    /// How long an unread message is kept, in seconds (default: 4 days).
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

/// Receive configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveConfig {
    /// Maximum messages returned by one receive call (default: 10).
    #[serde(default = "default_max_batch")]
    pub max_batch: u32,
}

/// Push notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Send webhook notifications at all (default: true).
    #[serde(default = "default_push_enabled")]
    pub enabled: bool,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_push_timeout")]
    pub timeout_secs: u64,
}

/// Cleanup task configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// Cleanup interval in seconds (default: 3600 = 1 hour).
    #[serde(default = "default_cleanup_interval")]
    pub interval_secs: u64,
    /// Enable cleanup task (default: true).
    #[serde(default = "default_cleanup_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_database_path() -> PathBuf {
    PathBuf::from("pairlink.db")
}

fn default_max_payload_size() -> usize {
    256 * 1024 // 256 KiB
}

fn default_retention_secs() -> u64 {
    4 * 24 * 60 * 60 // 4 days in seconds
}

fn default_max_batch() -> u32 {
    10
}

fn default_push_enabled() -> bool {
    true
}

fn default_push_timeout() -> u64 {
    10
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

fn default_cleanup_enabled() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            max_payload_size: default_max_payload_size(),
            retention_secs: default_retention_secs(),
        }
    }
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            max_batch: default_max_batch(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: default_push_enabled(),
            timeout_secs: default_push_timeout(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_cleanup_interval(),
            enabled: default_cleanup_enabled(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
