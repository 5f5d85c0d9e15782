//! The gate orders the lockout check and the password comparison.

use tracing::{info, warn};

use super::ledger::{LockoutLedger, MAX_FAILURES};
use super::verifier::{CredentialVerifier, VerifyOutcome};
use crate::store::StoreError;

/// Decision for one login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted; carries the verified username.
    Accepted(String),
    /// Wrong credentials; `n` attempts remain before the lock.
    RejectedWithRemaining(u8),
    /// The identifier is locked; the password was not evaluated.
    RejectedLocked,
    /// Empty username or password; the ledger was not consulted.
    RejectedBadInput,
    /// Bootstrap login before any administrator password was set.
    NotInstalled,
}

impl LoginOutcome {
    /// User-facing reason string for rejections.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Accepted(_) => "success".to_string(),
            Self::RejectedWithRemaining(remaining) => {
                format!("wrong password, {remaining} attempts remaining")
            }
            Self::RejectedLocked => {
                "account locked, wait for the cooldown to elapse".to_string()
            }
            Self::RejectedBadInput => "username and password are required".to_string(),
            Self::NotInstalled => "administrator account not configured".to_string(),
        }
    }
}

pub struct AuthenticationGate {
    ledger: LockoutLedger,
    verifier: CredentialVerifier,
}

impl AuthenticationGate {
    #[must_use]
    pub fn new(ledger: LockoutLedger, verifier: CredentialVerifier) -> Self {
        Self { ledger, verifier }
    }

    pub fn ledger(&self) -> &LockoutLedger {
        &self.ledger
    }

    /// Decide one login attempt from `identifier`.
    ///
    /// The ledger is consulted first: a locked identifier is rejected before
    /// the password is ever compared, and without re-arming the lock. A
    /// correct password submitted while locked is therefore still rejected
    /// until the window from the third failure elapses.
    ///
    /// # Errors
    /// External store failures surface as errors and leave the ledger
    /// untouched.
    pub async fn login(
        &self,
        identifier: &str,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, StoreError> {
        if username.is_empty() || password.is_empty() {
            return Ok(LoginOutcome::RejectedBadInput);
        }

        if let Some(record) = self.ledger.get(identifier) {
            if record.count >= MAX_FAILURES {
                warn!(identifier, "login attempt while locked");
                return Ok(LoginOutcome::RejectedLocked);
            }
            match self.verifier.verify(username, password).await? {
                VerifyOutcome::Match => {
                    self.ledger.clear(identifier);
                    info!(identifier, username, "login accepted");
                    Ok(LoginOutcome::Accepted(username.to_string()))
                }
                VerifyOutcome::Mismatch => {
                    let count = self.ledger.record_failure(identifier);
                    warn!(identifier, count, "login rejected");
                    Ok(LoginOutcome::RejectedWithRemaining(MAX_FAILURES - count))
                }
                VerifyOutcome::NotInstalled => Ok(LoginOutcome::NotInstalled),
            }
        } else {
            match self.verifier.verify(username, password).await? {
                VerifyOutcome::Match => {
                    info!(identifier, username, "login accepted");
                    Ok(LoginOutcome::Accepted(username.to_string()))
                }
                VerifyOutcome::Mismatch => {
                    let count = self.ledger.record_failure(identifier);
                    warn!(identifier, count, "login rejected");
                    Ok(LoginOutcome::RejectedWithRemaining(MAX_FAILURES - count))
                }
                VerifyOutcome::NotInstalled => Ok(LoginOutcome::NotInstalled),
            }
        }
    }
}
