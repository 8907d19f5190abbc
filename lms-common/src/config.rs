//! Bootstrap configuration loading
//!
//! Resolution order for every setting:
//! 1. Command-line argument (applied by the binary)
//! 2. Environment variable (applied by the binary via clap `env`)
//! 3. TOML config file
//! 4. Built-in default
//!
//! Only bootstrap concerns live here. Everything the dispatcher reads at
//! request time (courses, sessions, completion) comes from the host database.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP port for lms-ajax
pub const DEFAULT_PORT: u16 = 5780;

/// Default name of the host session cookie
pub const DEFAULT_SESSION_COOKIE: &str = "LMSSESSION";

/// Bootstrap configuration loaded from TOML
///
/// Every field has a default so that an absent or partial file still
/// produces a usable configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Path to the host SQLite database
    pub database_path: PathBuf,

    /// Interface to bind
    pub host: String,

    /// HTTP server port
    pub port: u16,

    /// Name of the cookie carrying the host session id
    pub session_cookie: String,

    /// Sessions idle for longer than this are rejected
    pub session_timeout_secs: i64,

    /// SQLite busy timeout applied to every pooled connection
    pub busy_timeout_ms: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full EnvFilter directive
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            session_timeout_secs: 7200,
            busy_timeout_ms: 5000,
            logging: LoggingConfig::default(),
        }
    }
}

impl BootstrapConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BootstrapConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from an explicit path, the platform default path,
    /// or fall back to built-in defaults when no file exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("port must be non-zero".to_string()));
        }
        if self.session_cookie.trim().is_empty() {
            return Err(Error::Config("session_cookie must not be empty".to_string()));
        }
        if self.session_timeout_secs <= 0 {
            return Err(Error::Config(
                "session_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Platform config file location (`<config_dir>/lms-ajax/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lms-ajax").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lms-ajax"))
        .unwrap_or_else(|| PathBuf::from("./lms_data"))
        .join("lms.db")
}
