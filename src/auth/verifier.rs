//! Credential verification against the external stores.

use std::sync::Arc;
use tracing::debug;

use crate::store::{KvStore, StoreError, UserStore, ADMIN_PASS_KEY, BOOTSTRAP_USER};

/// Result of comparing submitted credentials against the stored ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Match,
    Mismatch,
    /// The bootstrap administrator has no stored password yet; the
    /// installation has not been completed. Not a credential failure.
    NotInstalled,
}

pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    kv: Arc<dyn KvStore>,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, kv: Arc<dyn KvStore>) -> Self {
        Self { users, kv }
    }

    /// Compare `password` against the stored representation for `username`.
    ///
    /// The bootstrap identity reads its expected password from the kv store;
    /// every other username goes through the user store, and an unknown
    /// username is a plain mismatch so it still counts as a failed attempt.
    ///
    /// # Errors
    /// Returns the store error when a lookup fails. Backend failures are not
    /// credential failures and must not touch the lockout ledger.
    pub async fn verify(&self, username: &str, password: &str) -> Result<VerifyOutcome, StoreError> {
        let expected = if username == BOOTSTRAP_USER {
            match self.kv.get(ADMIN_PASS_KEY).await? {
                Some(stored) if !stored.is_empty() => stored,
                _ => return Ok(VerifyOutcome::NotInstalled),
            }
        } else {
            match self.users.find_password(username).await? {
                Some(stored) => stored,
                None => {
                    debug!("unknown username");
                    return Ok(VerifyOutcome::Mismatch);
                }
            }
        };

        if expected == password {
            Ok(VerifyOutcome::Match)
        } else {
            Ok(VerifyOutcome::Mismatch)
        }
    }
}
