//! Account persistence and the credential store
//!
//! Besides the administrative operations, this is where presented keys are
//! resolved and checked against the role hierarchy for the authorization gate.

use super::bulk;
use crate::auth::{ApiKey, Password, Role, SecretHasher, is_authorized};
use crate::compose::{SparseFilter, SparsePatch, build_mutation, build_selector};
use crate::error::{AppError, AuthError, RequestError};
use crate::model::account::fields;
use crate::model::{
    Account, AccountFilter, AccountPatch, AccountView, CreatedAccount, NewAccount, OutcomeReport,
};
use crate::store::{Collection, Mutation, RecordId, Selector, StoreResult};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Default inactivity threshold of the sweep
pub const DEFAULT_INACTIVITY_DAYS: i64 = 30;

/// Operations on the account collection
#[derive(Clone)]
pub struct AccountRepository {
    collection: Arc<dyn Collection<Account>>,
    hasher: Arc<dyn SecretHasher>,
    inactivity: Duration,
}

impl AccountRepository {
    pub fn new(collection: Arc<dyn Collection<Account>>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self {
            collection,
            hasher,
            inactivity: Duration::days(DEFAULT_INACTIVITY_DAYS),
        }
    }

    /// Set the inactivity threshold of [`remove_inactive`](Self::remove_inactive)
    pub fn with_inactivity(mut self, inactivity: Duration) -> Self {
        self.inactivity = inactivity;
        self
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<AccountView>, AppError> {
        let accounts = self.collection.find_all().await?;
        Ok(accounts.iter().map(AccountView::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<AccountView, AppError> {
        let id: RecordId = id.parse()?;
        self.collection
            .find_one_by_id(id)
            .await?
            .map(|account| AccountView::from(&account))
            .ok_or_else(|| RequestError::NotFound(format!("No account with id {}", id)).into())
    }

    /// Account holding `key`, if any
    pub async fn resolve_by_key(&self, key: &ApiKey) -> StoreResult<Option<Account>> {
        self.collection
            .find_one(&Selector::eq(fields::API_KEY, key.clone()))
            .await
    }

    /// Account holding `key` if its role satisfies `required`
    ///
    /// Unknown keys and insufficient roles are indistinguishable to the caller.
    pub async fn authenticate(&self, key: &ApiKey, required: Role) -> StoreResult<Option<Account>> {
        let account = self.resolve_by_key(key).await?;
        Ok(account.filter(|a| is_authorized(a.role, required)))
    }

    /// Record activity of the account holding `key`; no-op for unknown keys
    pub async fn touch_activity(&self, key: &ApiKey, at: DateTime<Utc>) -> StoreResult<()> {
        let result = self
            .collection
            .update_one(
                &Selector::eq(fields::API_KEY, key.clone()),
                &Mutation::new().set(fields::LAST_ACCESSED, at),
            )
            .await?;
        debug!(matched = result.matched_count, "Activity touched");
        Ok(())
    }

    /// Create an account with a freshly issued key
    #[instrument(skip(self, new), fields(username = %new.username, role = %new.role))]
    pub async fn create(
        &self,
        new: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<OutcomeReport<CreatedAccount>, AppError> {
        self.insert(new.username, new.password, new.role, None, now)
            .await
            .map(|created| OutcomeReport::applied("New user created.", 1).with_value(created))
    }

    /// Seed an administrator unless the username is already taken
    ///
    /// Returns `None` if the account already existed.
    #[instrument(skip(self, password, key))]
    pub async fn bootstrap(
        &self,
        username: &str,
        password: Password,
        key: Option<ApiKey>,
        now: DateTime<Utc>,
    ) -> Result<Option<CreatedAccount>, AppError> {
        if self.find_by_username(username).await?.is_some() {
            debug!("Bootstrap account already present");
            return Ok(None);
        }
        match self
            .insert(username.to_string(), password, Role::Admin, key, now)
            .await
        {
            Ok(created) => Ok(Some(created)),
            Err(AppError::Request(RequestError::DuplicateAccount(_))) => {
                debug!("Bootstrap account created concurrently");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        self.collection
            .find_one(&Selector::eq(fields::USERNAME, username))
            .await
    }

    async fn insert(
        &self,
        username: String,
        password: Password,
        role: Role,
        key: Option<ApiKey>,
        now: DateTime<Utc>,
    ) -> Result<CreatedAccount, AppError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(RequestError::InvalidArgument("username must not be empty".into()).into());
        }
        if password.is_blank() {
            return Err(RequestError::InvalidArgument("password must not be empty".into()).into());
        }
        // Early exit before hashing; uniqueness itself is enforced on insert
        if self.find_by_username(&username).await?.is_some() {
            return Err(RequestError::DuplicateAccount(username).into());
        }

        let hasher = Arc::clone(&self.hasher);
        let hashed_secret = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))??;

        let api_key = match key {
            Some(key) if self.resolve_by_key(&key).await?.is_none() => key,
            Some(_) => {
                return Err(
                    RequestError::InvalidArgument("key is already issued to another account".into())
                        .into(),
                );
            }
            None => self.issue_unique_key().await?,
        };

        let unique_name = Selector::eq(fields::USERNAME, username.as_str());
        let account = Account {
            id: RecordId::default(),
            username: username.clone(),
            hashed_secret,
            role,
            active: true,
            api_key: api_key.clone(),
            last_accessed: now,
            created_at: now,
        };
        let Some(id) = self.collection.insert_if_absent(&unique_name, account).await? else {
            return Err(RequestError::DuplicateAccount(username).into());
        };
        info!(%id, "Account created");
        Ok(CreatedAccount { id, api_key })
    }

    async fn issue_unique_key(&self) -> StoreResult<ApiKey> {
        loop {
            let key = ApiKey::generate();
            if self.resolve_by_key(&key).await?.is_none() {
                return Ok(key);
            }
        }
    }

    /// Change the role of a single account
    #[instrument(skip(self))]
    pub async fn update_role(&self, id: &str, role: Role) -> Result<OutcomeReport, AppError> {
        let id: RecordId = id.parse()?;
        let result = self
            .collection
            .update_one(
                &Selector::by_id::<Account>(id),
                &Mutation::new().set(fields::ROLE, role),
            )
            .await?;
        let report = if result.matched_count == 0 {
            OutcomeReport::no_match("No account with matching id found, nothing updated.")
        } else {
            OutcomeReport::from_count(
                result.modified_count,
                "Record updated successfully.",
                "Account already holds the given role, nothing updated.",
            )
        };
        bulk::log_report(self.collection.name(), "update_role", &report);
        Ok(report)
    }

    /// Patch every account selected by the patch's creation-date filter
    #[instrument(skip(self))]
    pub async fn update_many(&self, patch: &AccountPatch) -> Result<OutcomeReport, AppError> {
        let mutation = build_mutation(patch).ok_or(RequestError::EmptyPatch)?;
        if patch.filter().is_empty() {
            return Err(RequestError::EmptyFilter.into());
        }
        let selector = build_selector(patch.filter(), self.collection.as_ref()).await?;
        bulk::update_many(self.collection.as_ref(), &selector, &mutation).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<OutcomeReport, AppError> {
        let id: RecordId = id.parse()?;
        let result = self
            .collection
            .delete_one(&Selector::by_id::<Account>(id))
            .await?;
        let report = OutcomeReport::from_count(
            result.deleted_count,
            "Record deleted successfully.",
            "No record with matching id found, nothing deleted.",
        );
        bulk::log_report(self.collection.name(), "remove", &report);
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn remove_many(&self, filter: &AccountFilter) -> Result<OutcomeReport, AppError> {
        if filter.is_empty() {
            return Err(RequestError::EmptyFilter.into());
        }
        let selector = build_selector(filter, self.collection.as_ref()).await?;
        bulk::delete_many(self.collection.as_ref(), &selector).await
    }

    /// Delete accounts idle for at least the inactivity threshold
    ///
    /// Accounts of the most privileged role are never removed.
    #[instrument(skip(self))]
    pub async fn remove_inactive(&self, now: DateTime<Utc>) -> Result<OutcomeReport, AppError> {
        let cutoff = now - self.inactivity;
        let selector = Selector::lte(fields::LAST_ACCESSED, cutoff)
            & Selector::ne(fields::ROLE, Role::MOST_PRIVILEGED);
        bulk::delete_many(self.collection.as_ref(), &selector).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::store::MemoryCollection;

    fn repo() -> AccountRepository {
        AccountRepository::new(
            Arc::new(MemoryCollection::<Account>::new()),
            Arc::new(Argon2Hasher::new()),
        )
    }

    fn new_account(username: &str, role: Role) -> NewAccount {
        NewAccount {
            username: username.into(),
            password: Password::new("pa55word"),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_issues_key_and_hashes_secret() {
        let repo = repo();
        let now = Utc::now();
        let report = repo.create(new_account("ada", Role::Teacher), now).await.unwrap();
        let created = report.value.unwrap();

        let account = repo.resolve_by_key(&created.api_key).await.unwrap().unwrap();
        assert_eq!(account.id, created.id);
        assert!(account.active);
        assert_eq!(account.created_at, now);
        assert_eq!(account.last_accessed, now);
        assert_ne!(account.hashed_secret, "pa55word");
        assert!(Argon2Hasher::new().verify(&Password::new("pa55word"), &account.hashed_secret));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = repo();
        repo.create(new_account("ada", Role::Teacher), Utc::now())
            .await
            .unwrap();
        let result = repo.create(new_account("ada", Role::Student), Utc::now()).await;
        assert!(matches!(
            result,
            Err(AppError::Request(RequestError::DuplicateAccount(_)))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let repo = repo();
        let key = ApiKey::from_presented("bootstrap-key").unwrap();
        let first = repo
            .bootstrap("root", Password::new("pw"), Some(key.clone()), Utc::now())
            .await
            .unwrap();
        assert_eq!(first.unwrap().api_key, key);

        let second = repo
            .bootstrap("root", Password::new("pw"), None, Utc::now())
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_role() {
        let repo = repo();
        let created = repo
            .create(new_account("ada", Role::Student), Utc::now())
            .await
            .unwrap()
            .value
            .unwrap();

        let report = repo
            .update_role(&created.id.to_string(), Role::Teacher)
            .await
            .unwrap();
        assert!(report.succeeded);

        let account = repo.authenticate(&created.api_key, Role::Teacher).await.unwrap();
        assert!(account.is_some());
    }

    #[tokio::test]
    async fn test_touch_unknown_key_is_noop() {
        let repo = repo();
        let key = ApiKey::from_presented("nobody").unwrap();
        repo.touch_activity(&key, Utc::now()).await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());
    }
}
