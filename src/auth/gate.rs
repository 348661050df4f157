//! Authorization gate
//!
//! Runs before every protected operation:
//!
//! ```text
//! Start → KeyExtracted → Resolved → Authorized → ActivityTouched → Proceed
//!    └─ NoKey (401)   └─ InvalidRole (500)   └─ Unauthenticated (403)
//! ```
//!
//! Early exits never touch the activity timestamp. A full traversal touches it
//! exactly once, with the authorizing key and the current time, before the
//! operation runs.

use super::key::ApiKey;
use super::role::Role;
use crate::error::GateRejection;
use crate::model::Account;
use crate::repository::AccountRepository;
use chrono::Utc;
use std::fmt;
use std::future::Future;
use tracing::{debug, error, warn};

/// Progress of a request through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Start,
    KeyExtracted,
    Resolved,
    Authorized,
    ActivityTouched,
    Proceed,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Checks presented keys against the credential store
#[derive(Clone)]
pub struct AuthorizationGate {
    accounts: AccountRepository,
}

impl AuthorizationGate {
    pub fn new(accounts: AccountRepository) -> Self {
        Self { accounts }
    }

    /// Authorize a presented key for an operation requiring `required_role`
    ///
    /// On success the returned account carries the refreshed activity time.
    pub async fn authorize(
        &self,
        presented: Option<&str>,
        required_role: &str,
    ) -> Result<Account, GateRejection> {
        debug!(state = %GateState::Start, required_role, "Gate entered");

        let Some(key) = presented.and_then(ApiKey::from_presented) else {
            warn!("Request without API key rejected");
            return Err(GateRejection::NoKey);
        };
        debug!(state = %GateState::KeyExtracted, ?key);

        let required: Role = match required_role.parse() {
            Ok(role) => role,
            Err(_) => {
                error!(required_role, "Operation declared with unknown role");
                return Err(GateRejection::InvalidRole(required_role.to_string()));
            }
        };
        debug!(state = %GateState::Resolved, %required);

        let Some(mut account) = self.accounts.authenticate(&key, required).await? else {
            warn!(?key, %required, "Key unknown or role insufficient");
            return Err(GateRejection::Unauthenticated);
        };
        debug!(state = %GateState::Authorized, account = %account.id, role = %account.role);

        let now = Utc::now();
        self.accounts.touch_activity(&key, now).await?;
        account.last_accessed = now;
        debug!(state = %GateState::ActivityTouched, account = %account.id);

        debug!(state = %GateState::Proceed, account = %account.id, "Gate passed");
        Ok(account)
    }

    /// Run `operation` only if the gate passes
    pub async fn guard<F, Fut, T>(
        &self,
        presented: Option<&str>,
        required_role: &str,
        operation: F,
    ) -> Result<T, GateRejection>
    where
        F: FnOnce(Account) -> Fut,
        Fut: Future<Output = T>,
    {
        let account = self.authorize(presented, required_role).await?;
        Ok(operation(account).await)
    }
}
