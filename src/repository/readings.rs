//! Reading persistence operations

use super::bulk;
use crate::compose::{SparseFilter, SparsePatch, build_mutation, build_selector};
use crate::error::{AppError, RequestError};
use crate::model::{OutcomeReport, Reading, ReadingFilter, ReadingPatch};
use crate::store::{Collection, Mutation, RecordId, Selector};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

/// Operations on the reading collection
#[derive(Clone)]
pub struct ReadingRepository {
    collection: Arc<dyn Collection<Reading>>,
}

impl ReadingRepository {
    pub fn new(collection: Arc<dyn Collection<Reading>>) -> Self {
        Self { collection }
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Reading>, AppError> {
        Ok(self.collection.find_all().await?)
    }

    /// Readings matching a sparse filter; an empty filter returns everything
    #[instrument(skip(self))]
    pub async fn get_filtered(&self, filter: &ReadingFilter) -> Result<Vec<Reading>, AppError> {
        let selector = build_selector(filter, self.collection.as_ref()).await?;
        Ok(self.collection.find_matching(&selector).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Reading, AppError> {
        let id: RecordId = id.parse()?;
        self.collection
            .find_one_by_id(id)
            .await?
            .ok_or_else(|| RequestError::NotFound(format!("No reading with id {}", id)).into())
    }

    /// Store a reading, returning it with its assigned identity
    #[instrument(skip(self, reading), fields(time = %reading.time))]
    pub async fn create(&self, mut reading: Reading) -> Result<Reading, AppError> {
        let id = self.collection.insert_one(reading.clone()).await?;
        reading.id = id;
        info!(%id, "Reading created");
        Ok(reading)
    }

    #[instrument(skip(self, readings), fields(count = readings.len()))]
    pub async fn create_many(
        &self,
        readings: Vec<Reading>,
    ) -> Result<OutcomeReport<Vec<RecordId>>, AppError> {
        if readings.is_empty() {
            return Err(
                RequestError::InvalidArgument("at least one reading is required".into()).into(),
            );
        }
        let ids = self.collection.insert_many(readings).await?;
        info!(count = ids.len(), "Readings created");
        Ok(OutcomeReport::applied("Record/s created successfully.", ids.len() as u64).with_value(ids))
    }

    /// Replace every non-identity field of one reading
    #[instrument(skip(self, replacement))]
    pub async fn replace(&self, id: &str, replacement: Reading) -> Result<OutcomeReport, AppError> {
        let id: RecordId = id.parse()?;
        let mutation = Mutation::replace_all(&replacement);
        let result = self
            .collection
            .update_one(&Selector::by_id::<Reading>(id), &mutation)
            .await?;

        let report = if result.matched_count == 0 {
            OutcomeReport::no_match("No record with matching id found, nothing updated.")
        } else if result.modified_count == 0 {
            OutcomeReport::no_match("Record already holds the given values, nothing updated.")
        } else {
            OutcomeReport::applied("Record updated successfully.", result.modified_count)
        };
        bulk::log_report(self.collection.name(), "replace", &report);
        Ok(report)
    }

    /// Patch every reading selected by the patch's filter
    #[instrument(skip(self))]
    pub async fn update_many(&self, patch: &ReadingPatch) -> Result<OutcomeReport, AppError> {
        let mutation = build_mutation(patch).ok_or(RequestError::EmptyPatch)?;
        if patch.filter().is_empty() {
            return Err(RequestError::EmptyFilter.into());
        }
        let selector = build_selector(patch.filter(), self.collection.as_ref()).await?;
        bulk::update_many(self.collection.as_ref(), &selector, &mutation).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<OutcomeReport, AppError> {
        let id: RecordId = id.parse()?;
        let result = self
            .collection
            .delete_one(&Selector::by_id::<Reading>(id))
            .await?;
        let report = OutcomeReport::from_count(
            result.deleted_count,
            "Record deleted successfully.",
            "No record with matching id found, nothing deleted.",
        );
        bulk::log_report(self.collection.name(), "delete", &report);
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn delete_many(&self, filter: &ReadingFilter) -> Result<OutcomeReport, AppError> {
        if filter.is_empty() {
            return Err(RequestError::EmptyFilter.into());
        }
        let selector = build_selector(filter, self.collection.as_ref()).await?;
        bulk::delete_many(self.collection.as_ref(), &selector).await
    }

    /// Delete readings observed at or before `now - days`
    #[instrument(skip(self))]
    pub async fn delete_older_than(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<OutcomeReport, AppError> {
        if days <= 0 {
            return Err(RequestError::InvalidArgument(
                "days must be a positive whole number".into(),
            )
            .into());
        }
        let cutoff = Duration::try_days(days)
            .and_then(|age| now.checked_sub_signed(age))
            .ok_or_else(|| RequestError::InvalidArgument(format!("{} days is out of range", days)))?;

        let filter = ReadingFilter {
            recorded_to: Some(cutoff),
            ..Default::default()
        };
        let selector = filter.base_selector()?;
        bulk::delete_many(self.collection.as_ref(), &selector).await
    }
}
