//! Collection abstraction

use super::document::Document;
use super::mutation::Mutation;
use super::selector::Selector;
use super::value::RecordId;
use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    /// Documents selected by the selector
    pub matched_count: u64,
    /// Documents whose stored values actually changed
    pub modified_count: u64,
}

/// Outcome of a delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// A named collection of documents of one entity type
///
/// Implementations must be safe for concurrent use. Identities are assigned
/// by the collection on insert.
#[async_trait]
pub trait Collection<D: Document>: Send + Sync {
    fn name(&self) -> &str;

    async fn find_all(&self) -> StoreResult<Vec<D>> {
        self.find_matching(&Selector::All).await
    }

    async fn find_matching(&self, selector: &Selector) -> StoreResult<Vec<D>>;

    async fn find_one(&self, selector: &Selector) -> StoreResult<Option<D>>;

    async fn find_one_by_id(&self, id: RecordId) -> StoreResult<Option<D>> {
        self.find_one(&Selector::by_id::<D>(id)).await
    }

    /// Insert a document, returning its assigned identity
    async fn insert_one(&self, doc: D) -> StoreResult<RecordId>;

    async fn insert_many(&self, docs: Vec<D>) -> StoreResult<Vec<RecordId>>;

    /// Insert `doc` unless a stored document matches `conflict`
    ///
    /// The check and the insert are one atomic step. Returns `None` when a
    /// conflicting document exists and nothing was inserted.
    async fn insert_if_absent(&self, conflict: &Selector, doc: D)
    -> StoreResult<Option<RecordId>>;

    async fn update_one(&self, selector: &Selector, mutation: &Mutation)
    -> StoreResult<UpdateResult>;

    async fn update_many(
        &self,
        selector: &Selector,
        mutation: &Mutation,
    ) -> StoreResult<UpdateResult>;

    async fn delete_one(&self, selector: &Selector) -> StoreResult<DeleteResult>;

    async fn delete_many(&self, selector: &Selector) -> StoreResult<DeleteResult>;
}
