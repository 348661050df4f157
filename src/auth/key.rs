//! Issued API keys

use crate::error::StoreError;
use crate::store::{FromValue, IntoValue, Value};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use std::fmt;

/// Number of random bytes in an issued key (256 bits)
pub const KEY_BYTES: usize = 32;

/// Opaque credential issued to an account at creation
///
/// `Debug` shows only a short prefix so keys do not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    /// Generate a new key from the thread-local CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wrap a key as presented by a caller
    ///
    /// Surrounding braces and whitespace are trimmed; a blank key is `None`.
    pub fn from_presented(raw: &str) -> Option<Self> {
        let trimmed = raw
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Explicitly expose the key value
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "ApiKey({}…)", prefix)
    }
}

impl IntoValue for ApiKey {
    fn into_value(self) -> Value {
        Value::Text(self.0)
    }
}

impl FromValue for ApiKey {
    fn from_value(value: Value) -> Result<Self, StoreError> {
        String::from_value(value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_are_unique_and_full_length() {
        let a = ApiKey::generate();
        let b = ApiKey::generate();
        assert_ne!(a, b);
        let decoded = URL_SAFE_NO_PAD.decode(a.expose()).unwrap();
        assert_eq!(decoded.len(), KEY_BYTES);
    }

    #[test]
    fn test_from_presented_trims_braces() {
        let key = ApiKey::from_presented("{abc123}").unwrap();
        assert_eq!(key.expose(), "abc123");

        let key = ApiKey::from_presented("  abc123 ").unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn test_blank_presented_key_is_none() {
        assert!(ApiKey::from_presented("").is_none());
        assert!(ApiKey::from_presented("  ").is_none());
        assert!(ApiKey::from_presented("{}").is_none());
    }

    #[test]
    fn test_debug_shows_prefix_only() {
        let key = ApiKey::from_presented("abcdefghijklmnop").unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("abcd"));
        assert!(!debug.contains("efgh"));
    }
}
