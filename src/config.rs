//! Service configuration.
//!
//! A [`Config`] is assembled once at startup and passed down explicitly:
//! built-in defaults, then an optional TOML file, then environment
//! variables (after loading `.env` if one exists).
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PORT` | `server.port` |
//! | `CORS_ORIGINS` | `server.cors_origins` (comma-separated) |
//! | `DB_HOST` | `db.host` |
//! | `DB_PORT` | `db.port` |
//! | `DB_USER` | `db.user` |
//! | `DB_PASSWORD` | `db.password` |
//! | `DB_NAME` | `db.name` |
//! | `LOG_FORMAT` | `logging.format` |

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Per-request deadline in seconds; `0` disables it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    3001
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default = "default_db_password")]
    pub password: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: default_db_password(),
            name: default_db_name(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_db_user() -> String {
    "postgres".to_string()
}
fn default_db_password() -> String {
    "postgres".to_string()
}
fn default_db_name() -> String {
    "neevs".to_string()
}
fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl ServerConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl Config {
    /// Overrides fields from environment variables. Unset or empty
    /// variables leave the current value in place.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {}", port))?;
        }
        if let Some(origins) = var("CORS_ORIGINS") {
            self.server.cors_origins = parse_origins(&origins);
        }
        if let Some(host) = var("DB_HOST") {
            self.db.host = host;
        }
        if let Some(port) = var("DB_PORT") {
            self.db.port = port
                .trim()
                .parse()
                .with_context(|| format!("DB_PORT is not a valid port: {}", port))?;
        }
        if let Some(user) = var("DB_USER") {
            self.db.user = user;
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.db.password = password;
        }
        if let Some(name) = var("DB_NAME") {
            self.db.name = name;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }
        if self.server.cors_origins.is_empty() {
            anyhow::bail!("server.cors_origins must list at least one origin");
        }
        if self.db.max_connections == 0 {
            anyhow::bail!("db.max_connections must be >= 1");
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => anyhow::bail!(
                "Unknown logging format: '{}'. Must be pretty or json.",
                other
            ),
        }
        Ok(())
    }
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds the configuration from an optional TOML file plus the process
/// environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();

    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
