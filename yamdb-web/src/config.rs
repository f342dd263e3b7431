//! Server configuration
//!
//! Layered from lowest to highest precedence: built-in defaults, an optional
//! TOML file, environment variables, then command line flags (applied by the
//! binary).

use crate::{WebError, WebResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;
use yamdb_core::{LogFormat, LoggingConfig};

pub const DEFAULT_JWT_SECRET: &str = "yamdb-default-secret-change-in-production";

/// Longest accepted access token lifetime: one year
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Configuration for the web server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// SQLite URL; in-memory by default
    pub database_url: String,
    /// HS256 signing secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub token_ttl_minutes: i64,
    /// Sender address on confirmation mails
    pub mail_from: String,
    /// Bootstrap administrator, created at startup when both are set
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub logging: LoggingConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_minutes: 24 * 60,
            mail_from: "noreply@yamdb.local".to_string(),
            admin_username: None,
            admin_email: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: String) -> WebResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| WebError::Config(format!("{} has an invalid value: {:?}", name, raw)))
}

impl WebConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> WebResult<Self> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> WebResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            WebError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&text).map_err(|e| {
            WebError::Config(format!("Cannot parse config file {}: {}", path.display(), e))
        })
    }

    /// File (when given) then environment
    pub fn load(path: Option<&Path>) -> WebResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Overlay values found through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> WebResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("YAMDB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("YAMDB_PORT") {
            self.port = parse_env("YAMDB_PORT", port)?;
        }
        if let Some(dev_mode) = lookup("YAMDB_DEV_MODE") {
            self.dev_mode = parse_env("YAMDB_DEV_MODE", dev_mode)?;
        }
        if let Some(url) = lookup("YAMDB_DATABASE_URL").or_else(|| lookup("DATABASE_URL")) {
            self.database_url = url;
        }
        if let Some(secret) = lookup("YAMDB_JWT_SECRET").or_else(|| lookup("JWT_SECRET")) {
            self.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("YAMDB_TOKEN_TTL_MINUTES") {
            self.token_ttl_minutes = parse_env("YAMDB_TOKEN_TTL_MINUTES", ttl)?;
        }
        if let Some(from) = lookup("YAMDB_MAIL_FROM") {
            self.mail_from = from;
        }
        if let Some(username) = lookup("YAMDB_ADMIN_USERNAME") {
            self.admin_username = Some(username);
        }
        if let Some(email) = lookup("YAMDB_ADMIN_EMAIL") {
            self.admin_email = Some(email);
        }
        if let Some(level) = lookup("YAMDB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("YAMDB_LOG_FORMAT") {
            self.logging.format = format.parse::<LogFormat>().map_err(WebError::Config)?;
        }
        Ok(())
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> WebResult<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(WebError::Config("jwt_secret must not be empty".to_string()));
        }
        if self.token_ttl_minutes <= 0 || self.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(WebError::Config(format!(
                "token_ttl_minutes must be between 1 and {}",
                MAX_TOKEN_TTL_MINUTES
            )));
        }
        if self.database_url.trim().is_empty() {
            return Err(WebError::Config("database_url must not be empty".to_string()));
        }
        if self.admin_username.is_some() != self.admin_email.is_some() {
            return Err(WebError::Config(
                "admin_username and admin_email must be set together".to_string(),
            ));
        }
        if self.jwt_secret == DEFAULT_JWT_SECRET && !self.dev_mode {
            warn!("⚠️  Using the built-in JWT secret; set JWT_SECRET in production");
        }
        Ok(())
    }

    /// Bootstrap administrator credentials, if configured
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_email) {
            (Some(username), Some(email)) => Some((username.as_str(), email.as_str())),
            _ => None,
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
