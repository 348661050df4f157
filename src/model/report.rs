//! Outcome reports for mutating operations

use serde::Serialize;

pub const UPDATED: &str = "Record/s updated successfully.";
pub const DELETED: &str = "Record/s deleted successfully.";
pub const NO_MATCH: &str = "No records matching the given filters were found.";

/// Result of a create, update or delete
///
/// `succeeded = false` with zero records affected is a soft failure: the
/// request was well-formed but nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeReport<T = ()> {
    pub message: String,
    #[serde(rename = "wasSuccessful")]
    pub succeeded: bool,
    pub records_affected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

impl<T> OutcomeReport<T> {
    pub fn applied(message: impl Into<String>, records_affected: u64) -> Self {
        Self {
            message: message.into(),
            succeeded: true,
            records_affected,
            value: None,
        }
    }

    pub fn no_match(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            succeeded: false,
            records_affected: 0,
            value: None,
        }
    }

    /// Success if anything was affected, otherwise a soft failure
    pub fn from_count(count: u64, success: &str, failure: &str) -> Self {
        if count > 0 {
            Self::applied(success, count)
        } else {
            Self::no_match(failure)
        }
    }

    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn is_soft_failure(&self) -> bool {
        !self.succeeded
    }
}
