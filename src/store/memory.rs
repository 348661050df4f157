//! In-memory document store

use super::collection::{Collection, DeleteResult, StoreResult, UpdateResult};
use super::document::Document;
use super::mutation::Mutation;
use super::selector::Selector;
use super::value::RecordId;
use crate::error::StoreError;
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::debug;

/// Collection held in process memory
///
/// Bulk operations hold the write lock for their whole duration, so selection
/// and mutation are atomic per collection.
pub struct MemoryCollection<D: Document> {
    docs: RwLock<Vec<D>>,
    _entity: PhantomData<fn() -> D>,
}

impl<D: Document> MemoryCollection<D> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            _entity: PhantomData,
        }
    }

    fn assign_id(mut doc: D) -> (RecordId, D) {
        let id = RecordId::new();
        doc.set_id(id);
        (id, doc)
    }

    fn update(
        docs: &mut [D],
        selector: &Selector,
        mutation: &Mutation,
        limit: Option<usize>,
    ) -> StoreResult<UpdateResult> {
        let mut result = UpdateResult::default();
        for doc in docs.iter_mut().filter(|d| selector.matches(&**d)) {
            if limit.is_some_and(|l| result.matched_count as usize >= l) {
                break;
            }
            result.matched_count += 1;
            if mutation.apply(doc)? {
                result.modified_count += 1;
            }
        }
        Ok(result)
    }
}

impl<D: Document> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D: Document> Collection<D> for MemoryCollection<D> {
    fn name(&self) -> &str {
        D::COLLECTION
    }

    async fn find_matching(&self, selector: &Selector) -> StoreResult<Vec<D>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| selector.matches(*d)).cloned().collect())
    }

    async fn find_one(&self, selector: &Selector) -> StoreResult<Option<D>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| selector.matches(*d)).cloned())
    }

    async fn insert_one(&self, doc: D) -> StoreResult<RecordId> {
        let (id, doc) = Self::assign_id(doc);
        self.docs.write().await.push(doc);
        debug!(collection = D::COLLECTION, %id, "Inserted document");
        Ok(id)
    }

    async fn insert_many(&self, docs: Vec<D>) -> StoreResult<Vec<RecordId>> {
        let mut stored = self.docs.write().await;
        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            let (id, doc) = Self::assign_id(doc);
            stored.push(doc);
            ids.push(id);
        }
        debug!(collection = D::COLLECTION, count = ids.len(), "Inserted documents");
        Ok(ids)
    }

    async fn insert_if_absent(
        &self,
        conflict: &Selector,
        doc: D,
    ) -> StoreResult<Option<RecordId>> {
        let mut stored = self.docs.write().await;
        if stored.iter().any(|d| conflict.matches(d)) {
            debug!(collection = D::COLLECTION, "Insert skipped, conflicting document");
            return Ok(None);
        }
        let (id, doc) = Self::assign_id(doc);
        stored.push(doc);
        debug!(collection = D::COLLECTION, %id, "Inserted document");
        Ok(Some(id))
    }

    async fn update_one(
        &self,
        selector: &Selector,
        mutation: &Mutation,
    ) -> StoreResult<UpdateResult> {
        let mut docs = self.docs.write().await;
        Self::update(&mut docs, selector, mutation, Some(1))
    }

    async fn update_many(
        &self,
        selector: &Selector,
        mutation: &Mutation,
    ) -> StoreResult<UpdateResult> {
        let mut docs = self.docs.write().await;
        Self::update(&mut docs, selector, mutation, None)
    }

    async fn delete_one(&self, selector: &Selector) -> StoreResult<DeleteResult> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|d| selector.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult::default()),
        }
    }

    async fn delete_many(&self, selector: &Selector) -> StoreResult<DeleteResult> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| !selector.matches(d));
        Ok(DeleteResult {
            deleted_count: (before - docs.len()) as u64,
        })
    }
}

/// A named set of in-memory collections, created on first use
pub struct MemoryDatabase {
    name: String,
    collections: Mutex<HashMap<&'static str, Arc<dyn Any + Send + Sync>>>,
}

impl MemoryDatabase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// Collection for entity `D`, keyed by `D::COLLECTION`
    pub fn collection<D: Document>(&self) -> StoreResult<Arc<MemoryCollection<D>>> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = collections
            .entry(D::COLLECTION)
            .or_insert_with(|| -> Arc<dyn Any + Send + Sync> {
                debug!(database = %self.name, collection = D::COLLECTION, "Collection created");
                Arc::new(MemoryCollection::<D>::new())
            })
            .clone();
        entry
            .downcast::<MemoryCollection<D>>()
            .map_err(|_| StoreError::CollectionType {
                collection: D::COLLECTION,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, Reading};
    use chrono::Utc;

    fn reading(temperature: Option<f64>) -> Reading {
        let mut r = Reading::at(Utc::now());
        r.temperature = temperature;
        r
    }

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let coll = MemoryCollection::<Reading>::new();
        let id = coll.insert_one(reading(Some(1.0))).await.unwrap();
        assert!(!id.is_unassigned());

        let found = coll.find_one_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn test_update_counts_only_changed_documents() {
        let coll = MemoryCollection::<Reading>::new();
        coll.insert_many(vec![reading(Some(1.0)), reading(Some(2.0))])
            .await
            .unwrap();

        let result = coll
            .update_many(&Selector::All, &Mutation::new().set("temperature", 2.0))
            .await
            .unwrap();
        assert_eq!(result.matched_count, 2);
        assert_eq!(result.modified_count, 1);
    }

    #[tokio::test]
    async fn test_update_one_touches_single_document() {
        let coll = MemoryCollection::<Reading>::new();
        coll.insert_many(vec![reading(None), reading(None)])
            .await
            .unwrap();

        let result = coll
            .update_one(&Selector::All, &Mutation::new().set("humidity", 50.0))
            .await
            .unwrap();
        assert_eq!(result.modified_count, 1);

        let patched = coll
            .find_matching(&Selector::eq("humidity", 50.0))
            .await
            .unwrap();
        assert_eq!(patched.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_if_absent_skips_conflict() {
        let coll = MemoryCollection::<Reading>::new();
        let mut first = reading(Some(1.0));
        first.device_name = Some("Roof".into());
        let id = coll
            .insert_if_absent(&Selector::eq("device_name", "Roof"), first.clone())
            .await
            .unwrap();
        assert!(id.is_some());

        let again = coll
            .insert_if_absent(&Selector::eq("device_name", "Roof"), first)
            .await
            .unwrap();
        assert_eq!(again, None);
        assert_eq!(coll.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_many() {
        let coll = MemoryCollection::<Reading>::new();
        coll.insert_many(vec![reading(Some(1.0)), reading(Some(5.0)), reading(None)])
            .await
            .unwrap();

        let result = coll
            .delete_many(&Selector::gte("temperature", 2.0))
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 1);
        assert_eq!(coll.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_database_hands_out_same_collection() {
        let db = MemoryDatabase::new("test");
        let a = db.collection::<Reading>().unwrap();
        a.insert_one(reading(None)).await.unwrap();

        let b = db.collection::<Reading>().unwrap();
        assert_eq!(b.find_all().await.unwrap().len(), 1);

        let accounts = db.collection::<Account>().unwrap();
        assert_eq!(accounts.name(), "Users");
    }
}
