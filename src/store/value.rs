//! Field values
//!
//! Every stored field is exchanged with the store as a [`Value`]. Selectors
//! compare values and mutations assign them, so entity types only need to
//! convert their field types through [`IntoValue`] and [`FromValue`].

use crate::error::{RequestError, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identity of a stored record
///
/// Assigned by the store on insert and never changed afterwards. Callers
/// supply identities as strings; parsing failures are `InvalidIdentity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether this is the placeholder identity of a not-yet-stored record
    pub fn is_unassigned(&self) -> bool {
        self.0.is_nil()
    }
}

impl FromStr for RecordId {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RequestError::InvalidIdentity("empty id provided".into()));
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| RequestError::InvalidIdentity(format!("unable to parse id: {}", trimmed)))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single field value as seen by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Field is absent
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Id(RecordId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the value's kind (for error messages)
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Id(_) => "id",
        }
    }

    /// Order two values of the same kind
    ///
    /// Returns `None` when either side is null or the kinds differ, so range
    /// predicates never match absent fields.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Id(a), Value::Id(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Conversion of a field type into a store value
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion of a store value back into a field type
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, StoreError>;
}

fn mismatch(expected: &'static str, found: &Value) -> StoreError {
    StoreError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(mismatch("number", &other)),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl IntoValue for DateTime<Utc> {
    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl IntoValue for RecordId {
    fn into_value(self) -> Value {
        Value::Id(self)
    }
}

impl FromValue for RecordId {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Id(id) => Ok(id),
            other => Err(mismatch("id", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_parse() {
        let id = RecordId::new();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);

        let padded: RecordId = format!("  {}  ", id).parse().unwrap();
        assert_eq!(id, padded);
    }

    #[test]
    fn test_record_id_parse_invalid() {
        assert!(matches!(
            "not-an-id".parse::<RecordId>(),
            Err(RequestError::InvalidIdentity(_))
        ));
        assert!(matches!(
            "   ".parse::<RecordId>(),
            Err(RequestError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_default_id_is_unassigned() {
        assert!(RecordId::default().is_unassigned());
        assert!(!RecordId::new().is_unassigned());
    }

    #[test]
    fn test_compare_same_kind() {
        assert_eq!(
            Value::Number(1.0).compare(&Value::Number(2.0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Text("b".into()).compare(&Value::Text("a".into())),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_null_or_mixed_is_unordered() {
        assert_eq!(Value::Null.compare(&Value::Number(1.0)), None);
        assert_eq!(Value::Number(1.0).compare(&Value::Null), None);
        assert_eq!(Value::Number(1.0).compare(&Value::Text("1".into())), None);
    }

    #[test]
    fn test_option_conversion_keeps_absence_distinct_from_zero() {
        assert_eq!(None::<f64>.into_value(), Value::Null);
        assert_eq!(Some(0.0).into_value(), Value::Number(0.0));

        let absent: Option<f64> = FromValue::from_value(Value::Null).unwrap();
        assert_eq!(absent, None);
        let zero: Option<f64> = FromValue::from_value(Value::Number(0.0)).unwrap();
        assert_eq!(zero, Some(0.0));
    }

    #[test]
    fn test_type_mismatch() {
        let result = f64::from_value(Value::Text("21.5".into()));
        assert!(matches!(
            result,
            Err(StoreError::TypeMismatch {
                expected: "number",
                found: "text"
            })
        ));
    }
}
