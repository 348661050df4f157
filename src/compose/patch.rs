//! Partial-update composition
//!
//! A sparse patch lists optional new values for some of an entity's fields.
//! `#[derive(SparsePatch)]` walks the patch's fields; this module turns the
//! present ones into a [`Mutation`].

use super::filter::SparseFilter;
use crate::auth::Role;
use crate::store::{Document, IntoValue, Mutation, Value};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Presence test for one patch field
pub trait PatchField {
    /// The new value, or `None` if the field was not supplied
    fn present(&self) -> Option<Value>;
}

/// Blank text counts as absent
impl PatchField for Option<String> {
    fn present(&self) -> Option<Value> {
        self.as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| Value::Text(s.to_string()))
    }
}

macro_rules! optional_patch_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PatchField for Option<$ty> {
                fn present(&self) -> Option<Value> {
                    self.clone().map(IntoValue::into_value)
                }
            }
        )*
    };
}

optional_patch_field!(f64, bool, DateTime<Utc>, Role);

/// A patch object with an embedded filter
pub trait SparsePatch {
    type Filter: SparseFilter;

    /// Filter selecting the records that receive the patch
    fn filter(&self) -> &Self::Filter;

    /// `(field, value)` for every supplied field, in declaration order
    fn present_fields(&self) -> Vec<(&'static str, Value)>;
}

/// Compose the mutation for `patch`, `None` if no field was supplied
///
/// Identity fields are never assigned.
pub fn build_mutation<P: SparsePatch>(patch: &P) -> Option<Mutation> {
    assemble::<<P::Filter as SparseFilter>::Document>(patch.present_fields())
}

fn assemble<D: Document>(present: Vec<(&'static str, Value)>) -> Option<Mutation> {
    let mut mutation = Mutation::new();
    for (field, value) in present {
        if field == D::ID_FIELD {
            continue;
        }
        debug_assert!(
            D::field(field).is_some(),
            "patch field '{}' is not a field of {}",
            field,
            D::COLLECTION
        );
        mutation.push(field, value);
    }

    if mutation.is_empty() {
        debug!(collection = D::COLLECTION, "Patch has no fields");
        None
    } else {
        debug!(
            collection = D::COLLECTION,
            fields = mutation.len(),
            "Composed mutation"
        );
        Some(mutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_absent() {
        assert_eq!(Some("".to_string()).present(), None);
        assert_eq!(Some("  ".to_string()).present(), None);
        assert_eq!(None::<String>.present(), None);
        assert_eq!(
            Some("Station".to_string()).present(),
            Some(Value::Text("Station".into()))
        );
    }

    #[test]
    fn test_zero_is_present() {
        assert_eq!(Some(0.0_f64).present(), Some(Value::Number(0.0)));
        assert_eq!(Some(false).present(), Some(Value::Bool(false)));
        assert_eq!(None::<f64>.present(), None);
    }
}
