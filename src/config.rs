//! Configuration
//!
//! Handles loading configuration from TOML files and environment
//! variables. Environment variables override file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backing store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Redis endpoint, `host:port`
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Logical database index selecting the tenant namespace
    #[serde(default)]
    pub database: i64,

    /// Retention window in days; drives write TTLs and the compaction
    /// cutoff
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

fn default_addr() -> String {
    "127.0.0.1:6379".to_string()
}

fn default_retention_days() -> i64 {
    35
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            database: 0,
            retention_days: default_retention_days(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration from a file with environment overrides applied
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("TALLY_ADDR") {
            self.store.addr = addr;
        }
        if let Ok(database) = std::env::var("TALLY_DATABASE") {
            if let Ok(database) = database.parse() {
                self.store.database = database;
            } else {
                tracing::warn!("ignoring non-numeric TALLY_DATABASE");
            }
        }
        if let Ok(days) = std::env::var("TALLY_RETENTION_DAYS") {
            if let Ok(days) = days.parse() {
                self.store.retention_days = days;
            } else {
                tracing::warn!("ignoring non-numeric TALLY_RETENTION_DAYS");
            }
        }
        if let Ok(level) = std::env::var("TALLY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TALLY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.addr, "127.0.0.1:6379");
        assert_eq!(config.store.database, 0);
        assert_eq!(config.store.retention_days, 35);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [store]
            addr = "redis.internal:6380"
            retention_days = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.store.addr, "redis.internal:6380");
        assert_eq!(config.store.database, 0);
        assert_eq!(config.store.retention_days, 7);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[store]\ndatabase = 9\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.store.database, 9);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/tally.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [[[").unwrap();

        let result = Config::load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
