//! Layered configuration loading
//!
//! Later sources win:
//! 1. Defaults of the `types` structs
//! 2. TOML file (explicit path, or the first of [`DEFAULT_CONFIG_PATHS`] found)
//! 3. `WEATHER_RECORDS__*` environment variables
//! 4. `WEATHER_RECORDS_ADMIN_KEY`

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

/// Candidate config files, first existing one is used
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "weather-records.toml",
    ".weather-records.toml",
    "~/.config/weather-records/config.toml",
    "/etc/weather-records/config.toml",
];

/// Environment variable that overrides the bootstrap administrator key
pub const ADMIN_KEY_ENV: &str = "WEATHER_RECORDS_ADMIN_KEY";

/// Upper bound on the inactivity threshold
const MAX_INACTIVITY_DAYS: u32 = 36_500;

fn load_error(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Load(e.to_string())
}

/// Build, deserialize and validate
fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig = builder
        .build()
        .and_then(Config::try_deserialize)
        .map_err(load_error)?;
    validate_config(&app_config)?;
    Ok(app_config)
}

/// Parse a TOML document on top of the defaults; no file or env lookup
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    finish(Config::builder().add_source(File::from_str(toml_str, FileFormat::Toml)))
}

/// Resolve the config file to read, if any
fn config_file(explicit: Option<&str>) -> Result<Option<String>, ConfigError> {
    match explicit {
        Some(path) if Path::new(path).exists() => Ok(Some(path.to_string())),
        Some(path) => Err(load_error(format!("config file {} does not exist", path))),
        None => Ok(DEFAULT_CONFIG_PATHS
            .iter()
            .map(|path| shellexpand::tilde(path).into_owned())
            .find(|path| Path::new(path).exists())),
    }
}

/// Load configuration from file and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_file(config_path)? {
        builder = builder.add_source(File::new(&path, FileFormat::Toml));
    }

    // e.g. WEATHER_RECORDS__SERVER__PORT, WEATHER_RECORDS__AUTH__KEY_PARAM
    builder = builder.add_source(
        Environment::with_prefix("WEATHER_RECORDS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    if let Ok(key) = std::env::var(ADMIN_KEY_ENV) {
        builder = builder
            .set_override("auth.admin_key", key)
            .map_err(load_error)?;
    }

    finish(builder)
}

/// Reject values the service cannot run with
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be non-zero".to_string(),
        });
    }

    if config.auth.key_param.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "auth.key_param".to_string(),
        });
    }

    if config.accounts.inactivity_days == 0 || config.accounts.inactivity_days > MAX_INACTIVITY_DAYS
    {
        return Err(ConfigError::Invalid {
            message: format!(
                "accounts.inactivity_days must be between 1 and {}",
                MAX_INACTIVITY_DAYS
            ),
        });
    }

    if config.store.database.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "store.database".to_string(),
        });
    }

    validate_bootstrap_admin(config)
}

/// Username and password of the bootstrap administrator come as a pair
fn validate_bootstrap_admin(config: &AppConfig) -> Result<(), ConfigError> {
    let auth = &config.auth;
    let username = auth
        .admin_username
        .as_deref()
        .filter(|u| !u.trim().is_empty());
    let password = auth.admin_password.as_ref().filter(|p| !p.is_blank());

    match (username, password) {
        (Some(_), None) => Err(ConfigError::Missing {
            field: "auth.admin_password".to_string(),
        }),
        (None, Some(_)) => Err(ConfigError::Missing {
            field: "auth.admin_username".to_string(),
        }),
        (None, None) if auth.admin_key.is_some() => Err(ConfigError::Invalid {
            message: "auth.admin_key requires auth.admin_username and auth.admin_password"
                .to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_over_defaults() {
        let toml = r#"
[server]
name = "records-under-test"
port = 8080

[accounts]
inactivity_days = 14
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.name, "records-under-test");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.accounts.inactivity_days, 14);
        assert_eq!(config.auth.key_param, "apiKey");
    }

    #[test]
    fn test_zero_port_error() {
        let result = load_config_from_str("[server]\nport = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_zero_inactivity_error() {
        let result = load_config_from_str("[accounts]\ninactivity_days = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_empty_key_param_error() {
        let result = load_config_from_str("[auth]\nkey_param = \"\"\n");
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_admin_username_without_password() {
        let result = load_config_from_str("[auth]\nadmin_username = \"root\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::Missing { field }) if field == "auth.admin_password"
        ));
    }

    #[test]
    fn test_admin_key_alone_is_invalid() {
        let result = load_config_from_str("[auth]\nadmin_key = \"k\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_complete_admin_bootstrap() {
        let toml = r#"
[auth]
admin_username = "root"
admin_password = "changeme"
admin_key = "fixed-key"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.auth.admin_username.as_deref(), Some("root"));
        assert_eq!(
            config.auth.admin_password.as_ref().map(|p| p.expose()),
            Some("changeme")
        );
    }
}
