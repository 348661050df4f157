//! Authentication and authorization
//!
//! Accounts present an opaque issued key; the [`AuthorizationGate`] resolves
//! it through the credential store and checks the account's role against the
//! role required by the operation.

pub mod gate;
pub mod hasher;
pub mod key;
pub mod role;
pub mod secret;

pub use gate::{AuthorizationGate, GateState};
pub use hasher::{Argon2Hasher, SecretHasher};
pub use key::ApiKey;
pub use role::{Role, is_authorized};
pub use secret::Password;
