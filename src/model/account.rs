//! User accounts

use crate::auth::{ApiKey, Password, Role};
use crate::compose::SparseFilter;
use crate::error::RequestError;
use crate::store::{RecordId, Selector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weather_records_macros::{Document, SparsePatch};

/// Stored field names of [`Account`]
pub mod fields {
    pub const USERNAME: &str = "username";
    pub const ROLE: &str = "role";
    pub const API_KEY: &str = "api_key";
    pub const LAST_ACCESSED: &str = "last_accessed";
    pub const CREATED_AT: &str = "created_at";
}

/// A stored account
///
/// Not serializable; responses use [`AccountView`] so the hashed secret and
/// the issued key never leave the service.
#[derive(Debug, Clone, Document)]
#[document(collection = "Users")]
pub struct Account {
    #[document(id)]
    pub id: RecordId,
    /// Unique among accounts
    pub username: String,
    /// One-way hash of the account secret
    pub hashed_secret: String,
    pub role: Role,
    pub active: bool,
    pub api_key: ApiKey,
    pub last_accessed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Public projection of an account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: RecordId,
    pub username: String,
    pub role: Role,
    pub active: bool,
    pub last_accessed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
            active: account.active,
            last_accessed: account.last_accessed,
            created_at: account.created_at,
        }
    }
}

/// Account creation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    pub password: Password,
    pub role: Role,
}

/// Identity and key of a newly created account
///
/// The only place an issued key is ever returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAccount {
    pub id: RecordId,
    #[serde(serialize_with = "serialize_key")]
    pub api_key: ApiKey,
}

fn serialize_key<S: serde::Serializer>(key: &ApiKey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(key.expose())
}

/// Sparse selection of accounts by creation time
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFilter {
    /// Inclusive lower bound on creation time
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    #[serde(alias = "createdto")]
    pub created_to: Option<DateTime<Utc>>,
}

impl SparseFilter for AccountFilter {
    type Document = Account;

    fn is_empty(&self) -> bool {
        self.created_from.is_none() && self.created_to.is_none()
    }

    fn base_selector(&self) -> Result<Selector, RequestError> {
        let mut selector = Selector::All;
        if let Some(from) = self.created_from {
            selector &= Selector::gte(fields::CREATED_AT, from);
        }
        if let Some(to) = self.created_to {
            selector &= Selector::lte(fields::CREATED_AT, to);
        }
        Ok(selector)
    }
}

/// Sparse update of accounts selected by creation time
#[derive(Debug, Clone, Default, Deserialize, SparsePatch)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    pub role: Option<Role>,
    pub active: Option<bool>,
    #[serde(default)]
    #[patch(filter)]
    pub filter: AccountFilter,
}

/// Single-account role change
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::SparsePatch;
    use crate::store::Value;

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: RecordId::new(),
            username: "marie".into(),
            hashed_secret: "$argon2id$...".into(),
            role: Role::Teacher,
            active: true,
            api_key: ApiKey::generate(),
            last_accessed: now,
            created_at: now,
        }
    }

    #[test]
    fn test_view_hides_secret_and_key() {
        let account = account();
        let json = serde_json::to_value(AccountView::from(&account)).unwrap();
        assert_eq!(json["username"], "marie");
        assert_eq!(json["role"], "Teacher");
        assert!(json.get("hashedSecret").is_none());
        assert!(json.get("apiKey").is_none());
    }

    #[test]
    fn test_created_account_echoes_key() {
        let account = account();
        let created = CreatedAccount {
            id: account.id,
            api_key: account.api_key.clone(),
        };
        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["apiKey"], account.api_key.expose());
    }

    #[test]
    fn test_new_account_rejects_unknown_role() {
        let result: Result<NewAccount, _> =
            serde_json::from_str(r#"{"username":"a","password":"b","role":"Janitor"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_present_fields() {
        let patch: AccountPatch = serde_json::from_str(
            r#"{"role":"Student","filter":{"createdFrom":"2024-01-01T00:00:00Z"}}"#,
        )
        .unwrap();
        assert_eq!(
            patch.present_fields(),
            vec![("role", Value::Text("Student".into()))]
        );
        assert!(!patch.filter().is_empty());
    }
}
