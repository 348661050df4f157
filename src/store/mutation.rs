//! Field-level mutations

use super::document::Document;
use super::value::{IntoValue, Value};
use crate::error::StoreError;

/// An ordered set of field assignments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutation {
    assignments: Vec<(&'static str, Value)>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment
    pub fn set(mut self, field: &'static str, value: impl IntoValue) -> Self {
        self.push(field, value.into_value());
        self
    }

    /// Add an assignment, replacing an earlier one for the same field
    pub fn push(&mut self, field: &'static str, value: Value) {
        match self.assignments.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = value,
            None => self.assignments.push((field, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn assignments(&self) -> &[(&'static str, Value)] {
        &self.assignments
    }

    /// Assign every non-identity field of `source`
    pub fn replace_all<D: Document>(source: &D) -> Self {
        let mut mutation = Self::new();
        for field in D::fields().iter().filter(|f| f.name != D::ID_FIELD) {
            mutation.push(field.name, (field.get)(source));
        }
        mutation
    }

    /// Apply to a document, returning whether any value changed
    ///
    /// The document is left untouched if any assignment fails.
    pub fn apply<D: Document>(&self, doc: &mut D) -> Result<bool, StoreError> {
        let mut updated = doc.clone();
        let mut changed = false;
        for (field, value) in &self.assignments {
            if *field == D::ID_FIELD {
                return Err(StoreError::ImmutableField { field });
            }
            if updated.get(field).as_ref() != Some(value) {
                updated.set(field, value.clone())?;
                changed = true;
            }
        }
        if changed {
            *doc = updated;
        }
        Ok(changed)
    }
}
