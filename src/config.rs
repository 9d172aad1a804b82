//! Configuration loading.
//!
//! Settings live in `config/app.toml` under the project base path. Each
//! top-level table is one environment:
//!
//! ```toml
//! [default]
//! envname = "development"
//!
//! [default.server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [default.database]
//! reader = "sqlite://quill.db"
//! writer = "sqlite://quill.db"
//! ```
//!
//! `ENV` names the table to use (`default` when unset) and `PROJECT_PATH` the
//! base path (`.` when unset).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment table used when `ENV` is not set.
pub const DEFAULT_ENV: &str = "default";

/// Location of the config file relative to the project base path.
pub const CONFIG_FILE: &str = "config/app.toml";

/// Application configuration for one environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Display name of the environment.
    #[serde(default = "default_envname")]
    pub envname: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_envname() -> String {
    DEFAULT_ENV.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            envname: default_envname(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Listening address.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerConfig {
    /// `host:port`, ready for [`Server::bind`](crate::Server::bind).
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connection URLs of the two storage handles.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Handle used for lookups.
    #[serde(default = "default_database_url")]
    pub reader: String,
    /// Handle used for inserts, updates and deletes.
    #[serde(default = "default_database_url")]
    pub writer: String,
}

fn default_database_url() -> String {
    "sqlite://quill.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { reader: default_database_url(), writer: default_database_url() }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` directives take precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Config {
    /// Loads the environment named by `ENV` from `config/app.toml` under the
    /// project base path.
    pub fn from_env() -> Result<Self> {
        let base = base_path(std::env::var("PROJECT_PATH").ok());
        let env = env_name(std::env::var("ENV").ok());
        Self::load(base.join(CONFIG_FILE), &env)
    }

    /// Loads table `env` from the file at `path`.
    pub fn load(path: impl AsRef<Path>, env: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&text, env)
    }

    /// Parses table `env` out of a TOML document.
    pub fn parse(text: &str, env: &str) -> Result<Self> {
        let mut doc: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| Error::Config(e.to_string()))?;
        let section = doc
            .remove(env)
            .ok_or_else(|| Error::Config(format!("no table named `{env}`")))?;
        section
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config(format!("table `{env}`: {e}")))
    }

    /// Replaces the server host and port with any values given.
    pub fn override_server(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }
}

/// Project base path: `project_path` when non-empty, `.` otherwise.
pub fn base_path(project_path: Option<String>) -> PathBuf {
    match project_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from("."),
    }
}

/// Environment name: `env` when non-empty, [`DEFAULT_ENV`] otherwise.
pub fn env_name(env: Option<String>) -> String {
    match env {
        Some(env) if !env.is_empty() => env,
        _ => DEFAULT_ENV.to_string(),
    }
}
