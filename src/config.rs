//! Service configuration.
//!
//! Defaults, optionally overlaid by a JSON file named in `REVIEWER_CONFIG`,
//! then by individual `REVIEWER_*` environment variables.

use crate::db::pool::PoolSettings;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_FILE_ENV: &str = "REVIEWER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{name} is invalid: {message}")]
    InvalidValue { name: String, message: String },
}

/// Runtime settings for the reviewer service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub http_address: String,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Per-request deadline in seconds.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight requests.
    pub shutdown_timeout_secs: u64,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Upper bound on pooled SQLite connections.
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_address: "0.0.0.0:8080".to_string(),
            database_path: PathBuf::from("data/reviewers.db"),
            request_timeout_secs: 10,
            shutdown_timeout_secs: 5,
            log_level: "info".to_string(),
            max_connections: PoolSettings::default().max_connections,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match non_empty(lookup(CONFIG_FILE_ENV)) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `REVIEWER_*` variables on top of this config.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_empty(lookup(name));

        if let Some(v) = get("REVIEWER_HTTP_ADDRESS") {
            self.http_address = v;
        }
        if let Some(v) = get("REVIEWER_DATABASE_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = get("REVIEWER_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_number("REVIEWER_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("REVIEWER_SHUTDOWN_TIMEOUT_SECS") {
            self.shutdown_timeout_secs = parse_number("REVIEWER_SHUTDOWN_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("REVIEWER_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = get("REVIEWER_MAX_CONNECTIONS") {
            self.max_connections = parse_number("REVIEWER_MAX_CONNECTIONS", &v)?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be greater than zero"));
        }
        if self.max_connections == 0 {
            return Err(invalid("max_connections", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_address
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid("http_address", e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            ..PoolSettings::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_number<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| invalid(name, format!("expected a number: {}", e)))
}

fn invalid(name: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.into(),
    }
}
