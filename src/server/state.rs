//! Shared handler state

use crate::auth::{ApiKey, Argon2Hasher, AuthorizationGate};
use crate::config::{AppConfig, AuthConfig};
use crate::error::{AppError, ConfigError};
use crate::model::{Account, Reading};
use crate::repository::{AccountRepository, ReadingRepository};
use crate::store::MemoryDatabase;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub readings: ReadingRepository,
    pub accounts: AccountRepository,
    pub gate: AuthorizationGate,
    /// Query parameter carrying the presented key
    pub key_param: Arc<str>,
    /// Reported by the health endpoint
    pub service_name: Arc<str>,
}

impl AppState {
    pub fn new(readings: ReadingRepository, accounts: AccountRepository) -> Self {
        let gate = AuthorizationGate::new(accounts.clone());
        Self {
            readings,
            accounts,
            gate,
            key_param: Arc::from("apiKey"),
            service_name: Arc::from(env!("CARGO_PKG_NAME")),
        }
    }

    pub fn with_key_param(mut self, key_param: impl Into<Arc<str>>) -> Self {
        self.key_param = key_param.into();
        self
    }

    pub fn with_service_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.service_name = name.into();
        self
    }
}

impl AppState {
    /// Wire repositories over `db` and seed the bootstrap administrator
    pub async fn from_config(
        config: &AppConfig,
        db: &MemoryDatabase,
    ) -> Result<Self, AppError> {
        let inactivity = Duration::try_days(i64::from(config.accounts.inactivity_days)).ok_or_else(
            || ConfigError::Invalid {
                message: "accounts.inactivity_days is out of range".to_string(),
            },
        )?;

        let readings = ReadingRepository::new(db.collection::<Reading>()?);
        let accounts = AccountRepository::new(db.collection::<Account>()?, Arc::new(Argon2Hasher::new()))
            .with_inactivity(inactivity);

        seed_admin(&config.auth, &accounts).await?;

        Ok(Self::new(readings, accounts)
            .with_key_param(config.auth.key_param.as_str())
            .with_service_name(config.server.name.as_str()))
    }
}

async fn seed_admin(auth: &AuthConfig, accounts: &AccountRepository) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&auth.admin_username, &auth.admin_password) else {
        return Ok(());
    };
    let key = auth.admin_key.as_deref().and_then(ApiKey::from_presented);
    match accounts
        .bootstrap(username, password.clone(), key, Utc::now())
        .await?
    {
        Some(created) => info!(account = %created.id, username, "Seeded administrator account"),
        None => info!(username, "Administrator account already present"),
    }
    Ok(())
}
