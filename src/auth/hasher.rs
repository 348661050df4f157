//! One-way secret hashing

use super::secret::Password;
use crate::error::AuthError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash and verify account secrets
///
/// Implementations must be one-way; the stored string is never reversible.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, password: &Password) -> Result<String, AuthError>;

    fn verify(&self, password: &Password, hashed: &str) -> bool;
}

/// Argon2id with default parameters, stored as a PHC string
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, password: &Password) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    fn verify(&self, password: &Password, hashed: &str) -> bool {
        PasswordHash::new(hashed)
            .and_then(|parsed| {
                Argon2::default().verify_password(password.expose().as_bytes(), &parsed)
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let password = Password::new("correct horse");
        let hashed = hasher.hash(&password).unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(!hashed.contains("correct horse"));
        assert!(hasher.verify(&password, &hashed));
        assert!(!hasher.verify(&Password::new("wrong"), &hashed));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = Argon2Hasher::new();
        let password = Password::new("secret");
        assert_ne!(hasher.hash(&password).unwrap(), hasher.hash(&password).unwrap());
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(!Argon2Hasher::new().verify(&Password::new("x"), "not a phc string"));
    }
}
