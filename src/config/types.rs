//! Configuration types for weather-records
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::auth::Password;
use serde::Deserialize;
use std::fmt;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Credential handling and bootstrap administrator
    pub auth: AuthConfig,

    /// Account lifecycle settings
    pub accounts: AccountsConfig,

    /// Document store settings
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Service name (reported by /health)
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5080,
            name: "weather-records".to_string(),
        }
    }
}

/// Authentication configuration
///
/// When `admin_username` and `admin_password` are both set, an administrator
/// account is seeded at startup if it does not exist yet. `admin_key` pins its
/// issued key instead of generating one.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Query parameter carrying the presented key
    pub key_param: String,

    pub admin_username: Option<String>,

    pub admin_password: Option<Password>,

    pub admin_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_param: "apiKey".to_string(),
            admin_username: None,
            admin_password: None,
            admin_key: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("key_param", &self.key_param)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password)
            .field("admin_key", &self.admin_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Account lifecycle configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Days without activity after which the sweep removes an account
    pub inactivity_days: u32,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            inactivity_days: 30,
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database name
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: "WeatherData".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5080);
        assert_eq!(config.auth.key_param, "apiKey");
        assert_eq!(config.accounts.inactivity_days, 30);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.auth.admin_username.is_none());
    }

    #[test]
    fn test_deserialize_log_format() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_auth_debug_redacts_credentials() {
        let auth = AuthConfig {
            admin_username: Some("root".into()),
            admin_password: Some(Password::new("hunter2")),
            admin_key: Some("issued-key".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", auth);
        assert!(debug.contains("root"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("issued-key"));
    }
}
