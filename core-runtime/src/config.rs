//! # Catalog Configuration
//!
//! Settings the host needs to stand the catalog up: which store to open, how
//! large its pool may grow and how to log.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CatalogConfig;
//!
//! let config = CatalogConfig::builder()
//!     .database_url("sqlite:library.db")
//!     .max_connections(4)
//!     .build()?;
//! ```
//!
//! Or from the environment:
//!
//! | Variable                  | Default            |
//! |---------------------------|--------------------|
//! | `CATALOG_DATABASE_URL`    | `sqlite::memory:`  |
//! | `CATALOG_MAX_CONNECTIONS` | `5`                |
//! | `CATALOG_LOG_LEVEL`       | `info`             |
//! | `CATALOG_LOG_FORMAT`      | build dependent    |
//!
//! ## Error Handling
//!
//! `build()` and `from_env()` validate eagerly and fail with an actionable
//! message instead of handing out a config the pool would reject later.

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LoggingConfig};
use bridge_traits::time::LogLevel;
use serde::{Deserialize, Serialize};

pub const ENV_DATABASE_URL: &str = "CATALOG_DATABASE_URL";
pub const ENV_MAX_CONNECTIONS: &str = "CATALOG_MAX_CONNECTIONS";
pub const ENV_LOG_LEVEL: &str = "CATALOG_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "CATALOG_LOG_FORMAT";

const IN_MEMORY_URL: &str = "sqlite::memory:";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const MAX_CONNECTIONS_LIMIT: u32 = 64;

/// Runtime configuration for the catalog.
///
/// Use [`CatalogConfigBuilder`] or [`CatalogConfig::from_env`] to construct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// `sqlite:` URL of the catalog database
    pub database_url: String,

    /// Upper bound for the connection pool (in-memory stores always use one)
    pub max_connections: u32,

    pub log_level: LogLevel,

    pub log_format: LogFormat,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: IN_MEMORY_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            log_level: LogLevel::Info,
            log_format: LogFormat::default(),
        }
    }
}

impl CatalogConfig {
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Reads the `CATALOG_*` variables; unset ones keep their defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set to something unparseable or the
    /// resulting configuration does not validate.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(url) = lookup(ENV_DATABASE_URL) {
            builder = builder.database_url(url);
        }

        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            let max = raw.trim().parse::<u32>().map_err(|e| Error::InvalidSetting {
                key: ENV_MAX_CONNECTIONS.to_string(),
                message: format!("'{}' is not a connection count: {}", raw, e),
            })?;
            builder = builder.max_connections(max);
        }

        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            let level = raw.parse::<LogLevel>().map_err(|e| Error::InvalidSetting {
                key: ENV_LOG_LEVEL.to_string(),
                message: e.to_string(),
            })?;
            builder = builder.log_level(level);
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            let format = raw.parse::<LogFormat>().map_err(|e| Error::InvalidSetting {
                key: ENV_LOG_FORMAT.to_string(),
                message: e.to_string(),
            })?;
            builder = builder.log_format(format);
        }

        builder.build()
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }

    /// Logging settings derived from this configuration
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_level(self.log_level)
            .with_format(self.log_format)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The database URL is a non-empty `sqlite:` URL
    /// - The pool size is between 1 and 64
    pub fn validate(&self) -> Result<()> {
        let url = self.database_url.trim();
        if url.is_empty() {
            return Err(Error::Config("Database URL cannot be empty".to_string()));
        }

        if !url.starts_with("sqlite:") {
            return Err(Error::Config(format!(
                "Database URL '{}' is not a sqlite: URL. \
                 Use sqlite:<path> for a file or sqlite::memory: for a scratch catalog.",
                url
            )));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "Max connections must be greater than 0".to_string(),
            ));
        }

        if self.max_connections > MAX_CONNECTIONS_LIMIT {
            return Err(Error::Config(format!(
                "Max connections exceeds the limit of {}",
                MAX_CONNECTIONS_LIMIT
            )));
        }

        Ok(())
    }
}

/// Builder for [`CatalogConfig`]
#[derive(Debug, Default)]
pub struct CatalogConfigBuilder {
    database_url: Option<String>,
    max_connections: Option<u32>,
    log_level: Option<LogLevel>,
    log_format: Option<LogFormat>,
}

impl CatalogConfigBuilder {
    /// Sets the database URL, e.g. `sqlite:library.db`.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Shorthand for a database file path.
    pub fn database_path(self, path: impl AsRef<std::path::Path>) -> Self {
        let url = format!("sqlite:{}", path.as_ref().display());
        self.database_url(url)
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// See [`CatalogConfig::validate`].
    pub fn build(self) -> Result<CatalogConfig> {
        let defaults = CatalogConfig::default();
        let config = CatalogConfig {
            database_url: self.database_url.unwrap_or(defaults.database_url),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            log_format: self.log_format.unwrap_or(defaults.log_format),
        };

        config.validate()?;

        Ok(config)
    }
}
