//! Bulk operation orchestration
//!
//! Applies a composed (selector, mutation) pair and turns the store's counts
//! into an [`OutcomeReport`]. Zero affected records is a soft failure, never an
//! error.

use crate::error::AppError;
use crate::model::OutcomeReport;
use crate::model::report::{DELETED, NO_MATCH, UPDATED};
use crate::store::{Collection, Document, Mutation, Selector};
use tracing::{info, warn};

/// Apply `mutation` to every document matching `selector`
pub async fn update_many<D: Document>(
    collection: &dyn Collection<D>,
    selector: &Selector,
    mutation: &Mutation,
) -> Result<OutcomeReport, AppError> {
    let result = collection.update_many(selector, mutation).await?;
    let report = OutcomeReport::from_count(result.modified_count, UPDATED, NO_MATCH);
    log_report(collection.name(), "update", &report);
    Ok(report)
}

/// Delete every document matching `selector`
pub async fn delete_many<D: Document>(
    collection: &dyn Collection<D>,
    selector: &Selector,
) -> Result<OutcomeReport, AppError> {
    let result = collection.delete_many(selector).await?;
    let report = OutcomeReport::from_count(result.deleted_count, DELETED, NO_MATCH);
    log_report(collection.name(), "delete", &report);
    Ok(report)
}

pub(crate) fn log_report<T>(collection: &str, operation: &str, report: &OutcomeReport<T>) {
    if report.succeeded {
        info!(
            collection,
            operation,
            records = report.records_affected,
            "Mutation applied"
        );
    } else {
        warn!(collection, operation, "{}", report.message);
    }
}
