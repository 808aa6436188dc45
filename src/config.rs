//! Configuration module for Mailroom.

use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::{MailroomError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public root URL of this server, used to build sender addresses.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/mailroom.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Templates configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// Path to the templates directory.
    #[serde(default = "default_templates_path")]
    pub path: String,
}

fn default_templates_path() -> String {
    "templates".to_string()
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            path: default_templates_path(),
        }
    }
}

/// Outbound delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Connection timeout in seconds.
    #[serde(default = "default_delivery_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds, per recipient.
    #[serde(default = "default_delivery_timeout")]
    pub timeout_secs: u64,
    /// User agent sent with delivery requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_delivery_connect_timeout() -> u64 {
    5
}

fn default_delivery_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mailroom/0.1 (delivery)".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_delivery_connect_timeout(),
            timeout_secs: default_delivery_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty logs to stdout only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/mailroom.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Templates configuration.
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Delivery configuration.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(MailroomError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| MailroomError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `MAILROOM_PUBLIC_URL`: Override the public root URL
    /// - `MAILROOM_DATABASE_PATH`: Override the database path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(public_url) = std::env::var("MAILROOM_PUBLIC_URL") {
            if !public_url.is_empty() {
                self.server.public_url = public_url;
            }
        }
        if let Ok(path) = std::env::var("MAILROOM_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the public URL is not an absolute http(s) URL
    /// or a delivery timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.server.public_url).map_err(|e| {
            MailroomError::Config(format!(
                "public_url '{}' is not a valid URL: {e}",
                self.server.public_url
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(MailroomError::Config(format!(
                "public_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.delivery.timeout_secs == 0 || self.delivery.connect_timeout_secs == 0 {
            return Err(MailroomError::Config(
                "delivery timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Public root URL without a trailing slash.
    pub fn root_url(&self) -> &str {
        self.server.public_url.trim_end_matches('/')
    }
}
