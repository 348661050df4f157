//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use weather_records::auth::{ApiKey, Password, Role, SecretHasher};
use weather_records::error::{AuthError, StoreError};
use weather_records::model::{Account, NewAccount, Reading};
use weather_records::repository::{AccountRepository, ReadingRepository};
use weather_records::store::{
    Collection, DeleteResult, Document, MemoryCollection, Mutation, RecordId, Selector,
    StoreResult, UpdateResult,
};

/// Reversible stand-in for Argon2 to keep tests fast
pub struct PlainHasher;

impl SecretHasher for PlainHasher {
    fn hash(&self, password: &Password) -> Result<String, AuthError> {
        Ok(format!("plain:{}", password.expose()))
    }

    fn verify(&self, password: &Password, hashed: &str) -> bool {
        hashed == format!("plain:{}", password.expose())
    }
}

/// Delegates to an in-memory collection and counts every call
pub struct CountingCollection<D: Document> {
    inner: MemoryCollection<D>,
    calls: AtomicUsize,
}

impl<D: Document> CountingCollection<D> {
    pub fn new() -> Self {
        Self {
            inner: MemoryCollection::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<D: Document> Collection<D> for CountingCollection<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find_matching(&self, selector: &Selector) -> StoreResult<Vec<D>> {
        self.count();
        self.inner.find_matching(selector).await
    }

    async fn find_one(&self, selector: &Selector) -> StoreResult<Option<D>> {
        self.count();
        self.inner.find_one(selector).await
    }

    async fn insert_one(&self, doc: D) -> StoreResult<RecordId> {
        self.count();
        self.inner.insert_one(doc).await
    }

    async fn insert_many(&self, docs: Vec<D>) -> StoreResult<Vec<RecordId>> {
        self.count();
        self.inner.insert_many(docs).await
    }

    async fn insert_if_absent(
        &self,
        conflict: &Selector,
        doc: D,
    ) -> StoreResult<Option<RecordId>> {
        self.count();
        self.inner.insert_if_absent(conflict, doc).await
    }

    async fn update_one(&self, selector: &Selector, mutation: &Mutation) -> StoreResult<UpdateResult> {
        self.count();
        self.inner.update_one(selector, mutation).await
    }

    async fn update_many(
        &self,
        selector: &Selector,
        mutation: &Mutation,
    ) -> StoreResult<UpdateResult> {
        self.count();
        self.inner.update_many(selector, mutation).await
    }

    async fn delete_one(&self, selector: &Selector) -> StoreResult<DeleteResult> {
        self.count();
        self.inner.delete_one(selector).await
    }

    async fn delete_many(&self, selector: &Selector) -> StoreResult<DeleteResult> {
        self.count();
        self.inner.delete_many(selector).await
    }
}

/// A collection whose backend is unreachable
pub struct FailingCollection;

fn unavailable() -> StoreError {
    StoreError::Unavailable("connection refused".into())
}

#[async_trait]
impl<D: Document> Collection<D> for FailingCollection {
    fn name(&self) -> &str {
        D::COLLECTION
    }

    async fn find_matching(&self, _: &Selector) -> StoreResult<Vec<D>> {
        Err(unavailable())
    }

    async fn find_one(&self, _: &Selector) -> StoreResult<Option<D>> {
        Err(unavailable())
    }

    async fn insert_one(&self, _: D) -> StoreResult<RecordId> {
        Err(unavailable())
    }

    async fn insert_many(&self, _: Vec<D>) -> StoreResult<Vec<RecordId>> {
        Err(unavailable())
    }

    async fn insert_if_absent(&self, _: &Selector, _: D) -> StoreResult<Option<RecordId>> {
        Err(unavailable())
    }

    async fn update_one(&self, _: &Selector, _: &Mutation) -> StoreResult<UpdateResult> {
        Err(unavailable())
    }

    async fn update_many(&self, _: &Selector, _: &Mutation) -> StoreResult<UpdateResult> {
        Err(unavailable())
    }

    async fn delete_one(&self, _: &Selector) -> StoreResult<DeleteResult> {
        Err(unavailable())
    }

    async fn delete_many(&self, _: &Selector) -> StoreResult<DeleteResult> {
        Err(unavailable())
    }
}

/// Noon UTC on the given day of March 2024
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

pub fn reading(device: Option<&str>, day: u32, temperature: Option<f64>) -> Reading {
    let mut r = Reading::at(march(day));
    r.device_name = device.map(str::to_string);
    r.temperature = temperature;
    r
}

/// Five readings spread over March 2024
pub fn fixture_readings() -> Vec<Reading> {
    vec![
        reading(Some("North Station"), 1, Some(12.0)),
        reading(Some("North Station"), 2, Some(18.5)),
        reading(Some("South Station"), 3, Some(24.0)),
        reading(Some("A.*B"), 4, None),
        reading(None, 5, Some(3.0)),
    ]
}

pub async fn seeded_readings() -> ReadingRepository {
    let collection = Arc::new(MemoryCollection::<Reading>::new());
    collection.insert_many(fixture_readings()).await.unwrap();
    ReadingRepository::new(collection)
}

pub fn account_repository(collection: Arc<dyn Collection<Account>>) -> AccountRepository {
    AccountRepository::new(collection, Arc::new(PlainHasher))
}

/// Create an account and return its issued key
pub async fn create_account(
    accounts: &AccountRepository,
    username: &str,
    role: Role,
    now: DateTime<Utc>,
) -> ApiKey {
    let report = accounts
        .create(
            NewAccount {
                username: username.to_string(),
                password: Password::new("secret"),
                role,
            },
            now,
        )
        .await
        .unwrap();
    report.value.unwrap().api_key
}

pub fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}
