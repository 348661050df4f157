//! Role hierarchy
//!
//! Roles are ranked by ordinal, and a LOWER ordinal is MORE privileged:
//! `Admin` (0) can do everything `Teacher` (1) can, which can do everything
//! `Student` (2) can.

use crate::error::{AuthError, StoreError};
use crate::store::{FromValue, IntoValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin = 0,
    Teacher = 1,
    Student = 2,
}

impl Role {
    /// The role no inactivity sweep may remove
    pub const MOST_PRIVILEGED: Role = Role::Admin;

    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        }
    }
}

/// Whether `presented` satisfies a requirement of `required`
pub fn is_authorized(presented: Role, required: Role) -> bool {
    presented.ordinal() <= required.ordinal()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive role name, the same rule serde applies to bodies
impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthError::InvalidRole(s.to_string()))
    }
}

impl IntoValue for Role {
    fn into_value(self) -> Value {
        Value::Text(self.as_str().to_string())
    }
}

impl FromValue for Role {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Text(name) => name.parse().map_err(|_| StoreError::TypeMismatch {
                expected: "role",
                found: "text",
            }),
            other => Err(StoreError::TypeMismatch {
                expected: "role",
                found: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_inverted() {
        assert_eq!(Role::Admin.ordinal(), 0);
        assert_eq!(Role::Teacher.ordinal(), 1);
        assert_eq!(Role::Student.ordinal(), 2);
        assert_eq!(Role::MOST_PRIVILEGED, Role::Admin);
    }

    #[test]
    fn test_is_authorized() {
        assert!(is_authorized(Role::Admin, Role::Student));
        assert!(is_authorized(Role::Teacher, Role::Teacher));
        assert!(!is_authorized(Role::Student, Role::Teacher));
        assert!(!is_authorized(Role::Teacher, Role::Admin));
    }

    #[test]
    fn test_parse_role() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_parse_and_deserialize_agree_on_case() {
        for name in ["teacher", "ADMIN", " Student"] {
            assert!(name.parse::<Role>().is_err(), "{name:?}");
            assert!(serde_json::from_value::<Role>(serde_json::json!(name)).is_err());
        }
        let parsed: Role = serde_json::from_value(serde_json::json!("Teacher")).unwrap();
        assert_eq!(parsed, "Teacher".parse::<Role>().unwrap());
    }

    #[test]
    fn test_parse_unknown_role() {
        let err = "Janitor".parse::<Role>().unwrap_err();
        assert!(matches!(err, AuthError::InvalidRole(name) if name == "Janitor"));
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(Role::Teacher.into_value(), Value::Text("Teacher".into()));
        assert_eq!(
            Role::from_value(Value::Text("Student".into())).unwrap(),
            Role::Student
        );
        assert!(Role::from_value(Value::Number(1.0)).is_err());
    }
}
