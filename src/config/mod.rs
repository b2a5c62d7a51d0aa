//! Configuration management
//!
//! This module handles loading and parsing configuration for the Gazette blog
//! service. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Outgoing mail configuration
    #[serde(default)]
    pub mail: MailConfig,
    /// Human-verification challenge configuration
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration (SQLite)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path or connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/gazette.db".to_string()
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Default cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached entries
    #[serde(default = "default_capacity")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_entries: default_capacity(),
        }
    }
}

fn default_ttl() -> u64 {
    3600
}

fn default_capacity() -> u64 {
    10_000
}

/// Outgoing mail (SMTP) configuration
///
/// When `smtp_host` is empty, notification dispatch is disabled and all sends
/// become no-ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host; empty disables mail
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password
    #[serde(default)]
    pub smtp_password: String,
    /// From address for outgoing mail
    #[serde(default = "default_mail_from")]
    pub from_address: String,
    /// Recipients for contact notifications
    #[serde(default)]
    pub contact_recipients: Vec<String>,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "no-reply@gazette.local".to_string()
}

impl MailConfig {
    /// Whether outgoing mail is configured at all
    pub fn is_enabled(&self) -> bool {
        !self.smtp_host.is_empty()
    }
}

/// Human-verification challenge configuration
///
/// The challenge is engaged only when both keys are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Public site key handed to clients
    #[serde(default)]
    pub site_key: Option<String>,
    /// Secret key used for server-side verification
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Verification endpoint of the external provider
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
}

fn default_verify_url() -> String {
    "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
}

impl ChallengeConfig {
    /// Both keys present means submissions must carry a valid token
    pub fn is_enabled(&self) -> bool {
        self.site_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.secret_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - GAZETTE_SERVER_HOST / GAZETTE_SERVER_PORT / GAZETTE_SERVER_CORS_ORIGIN
    /// - GAZETTE_DATABASE_URL
    /// - GAZETTE_CACHE_TTL_SECONDS
    /// - GAZETTE_SMTP_HOST / GAZETTE_SMTP_PORT
    /// - GAZETTE_CHALLENGE_SITE_KEY / GAZETTE_CHALLENGE_SECRET_KEY
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("GAZETTE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("GAZETTE_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("GAZETTE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("GAZETTE_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(ttl) = std::env::var("GAZETTE_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        if let Ok(host) = std::env::var("GAZETTE_SMTP_HOST") {
            self.mail.smtp_host = host;
        }
        if let Ok(port) = std::env::var("GAZETTE_SMTP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.mail.smtp_port = port;
            }
        }

        if let Ok(key) = std::env::var("GAZETTE_CHALLENGE_SITE_KEY") {
            self.challenge.site_key = Some(key);
        }
        if let Ok(key) = std::env::var("GAZETTE_CHALLENGE_SECRET_KEY") {
            self.challenge.secret_key = Some(key);
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert!(!config.challenge.is_enabled());
    }

    #[test]
    fn test_parse_partial_yaml_fills_defaults() {
        let yaml = "server:\n  port: 9000\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "data/gazette.db");
    }

    #[test]
    fn test_challenge_enabled_requires_both_keys() {
        let mut challenge = ChallengeConfig::default();
        assert!(!challenge.is_enabled());

        challenge.site_key = Some("pk".to_string());
        assert!(!challenge.is_enabled());

        challenge.secret_key = Some("sk".to_string());
        assert!(challenge.is_enabled());

        challenge.site_key = Some(String::new());
        assert!(!challenge.is_enabled());
    }

    #[test]
    fn test_mail_disabled_without_host() {
        let mail = MailConfig::default();
        assert!(!mail.is_enabled());
    }
}
