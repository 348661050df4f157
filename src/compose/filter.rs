//! Filter composition
//!
//! Turns a sparse filter into one conjunctive [`Selector`]. Each rule of the
//! filter contributes a predicate only when its input is present. Extremal
//! rules (e.g. "highest temperature") need a pre-scan of the collection and
//! are resolved after the cheap predicates so the scan is narrowed by them.

use crate::error::{AppError, RequestError};
use crate::store::{Collection, Document, Selector, Value};
use std::cmp::Ordering;
use tracing::debug;

/// Direction of an extremal rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremalOrder {
    Highest,
    Lowest,
}

/// Pin a field to its extreme value among the otherwise-selected records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremal {
    pub field: &'static str,
    pub order: ExtremalOrder,
}

impl Extremal {
    pub const fn highest(field: &'static str) -> Self {
        Self {
            field,
            order: ExtremalOrder::Highest,
        }
    }

    pub const fn lowest(field: &'static str) -> Self {
        Self {
            field,
            order: ExtremalOrder::Lowest,
        }
    }

    /// Extreme non-null value of the field among `docs`
    pub fn pick<D: Document>(&self, docs: &[D]) -> Option<Value> {
        let values = docs
            .iter()
            .filter_map(|doc| doc.get(self.field))
            .filter(|v| !v.is_null());
        let wanted = match self.order {
            ExtremalOrder::Highest => Ordering::Greater,
            ExtremalOrder::Lowest => Ordering::Less,
        };
        values.fold(None, |best, v| match best {
            Some(b) if v.compare(&b) != Some(wanted) => Some(b),
            _ => Some(v),
        })
    }
}

/// A filter object whose fields are all optional
pub trait SparseFilter: Send + Sync {
    type Document: Document;

    /// True when no rule would contribute a predicate
    fn is_empty(&self) -> bool;

    /// Conjunction of every present rule that can be evaluated per record
    fn base_selector(&self) -> Result<Selector, RequestError>;

    /// Rule that needs a pre-scan, if requested
    fn extremal(&self) -> Option<Extremal> {
        None
    }
}

/// Compose the selector for `filter` against `collection`
///
/// An empty filter yields [`Selector::All`]. An extremal rule that finds no
/// candidate value contributes nothing.
pub async fn build_selector<F>(
    filter: &F,
    collection: &dyn Collection<F::Document>,
) -> Result<Selector, AppError>
where
    F: SparseFilter + ?Sized,
{
    let selector = filter.base_selector()?;

    let Some(extremal) = filter.extremal() else {
        return Ok(selector);
    };

    let candidates = collection.find_matching(&selector).await?;
    match extremal.pick(&candidates) {
        Some(value) => {
            debug!(
                collection = collection.name(),
                field = extremal.field,
                %value,
                "Pinned extremal value"
            );
            Ok(selector.and(Selector::Eq(extremal.field, value)))
        }
        None => {
            debug!(
                collection = collection.name(),
                field = extremal.field,
                "No candidate for extremal rule"
            );
            Ok(selector)
        }
    }
}
