//! Declared field tables
//!
//! A [`Document`] exposes an ordered table of `(name, accessor, setter)`
//! entries generated by `#[derive(Document)]`. Selectors, mutations and the
//! composition engines walk this table instead of inspecting types at runtime.

use super::value::{RecordId, Value};
use crate::error::StoreError;

/// One entry of a document's field table
pub struct Field<T: 'static> {
    /// Stored field name
    pub name: &'static str,
    /// Read the field as a store value
    pub get: fn(&T) -> Value,
    /// Assign the field from a store value
    pub set: fn(&mut T, Value) -> Result<(), StoreError>,
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// A persisted entity with a declared field table
pub trait Document: Clone + Send + Sync + 'static {
    /// Collection the entity is stored in
    const COLLECTION: &'static str;
    /// Name of the identity field
    const ID_FIELD: &'static str;

    /// Field table in declaration order
    fn fields() -> &'static [Field<Self>];

    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);

    /// Look up a field table entry by name
    fn field(name: &str) -> Option<&'static Field<Self>> {
        Self::fields().iter().find(|f| f.name == name)
    }

    /// Read a field by name, `None` if the entity has no such field
    fn get(&self, name: &str) -> Option<Value> {
        Self::field(name).map(|f| (f.get)(self))
    }

    /// Assign a field by name
    fn set(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        let field = Self::field(name).ok_or_else(|| StoreError::UnknownField {
            collection: Self::COLLECTION,
            field: name.to_string(),
        })?;
        (field.set)(self, value)
    }
}
