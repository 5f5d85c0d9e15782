//! In-memory bearer session issuer.
//!
//! Tokens are 32 random bytes, base64url without padding. Only the SHA-256
//! hash of a token is kept in the table, so a raw token never rests in
//! memory longer than the request that carries it. Sessions are
//! process-local; a restart logs everyone out.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{Session, SessionBoundary, SessionError};
use crate::clock::{Clock, SystemClock};

/// Default session timeout; the renewal window matches it.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(120 * 60);

struct SessionEntry {
    identity: String,
    issued_at: Instant,
    expires_at: Instant,
}

pub struct BearerSessions {
    entries: Mutex<HashMap<Vec<u8>, SessionEntry>>,
    timeout: Duration,
    /// Refresh is allowed while `now <= issued_at + timeout + max_refresh`.
    max_refresh: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for BearerSessions {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}

impl BearerSessions {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            timeout,
            max_refresh: timeout,
            clock,
        }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Base64UrlUnpadded::encode_string(&bytes)
    }

    fn hash_token(token: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.finalize().to_vec()
    }

    // A panicked holder must not lock everyone out; every operation leaves
    // the map consistent, so a poisoned lock is safe to reclaim.
    fn table(&self) -> MutexGuard<'_, HashMap<Vec<u8>, SessionEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionBoundary for BearerSessions {
    fn issue(&self, identity: &str) -> Session {
        let token = Self::generate_token();
        let now = self.clock.now();
        let mut entries = self.table();
        entries.insert(
            Self::hash_token(&token),
            SessionEntry {
                identity: identity.to_string(),
                issued_at: now,
                expires_at: now + self.timeout,
            },
        );
        Session {
            token,
            max_age: self.timeout,
        }
    }

    fn extract_identity(&self, token: &str) -> Option<String> {
        let now = self.clock.now();
        let hash = Self::hash_token(token);
        let mut entries = self.table();
        match entries.get(&hash) {
            Some(entry) if entry.expires_at > now => Some(entry.identity.clone()),
            Some(_) => {
                entries.remove(&hash);
                None
            }
            None => None,
        }
    }

    fn refresh(&self, token: &str) -> Result<Session, SessionError> {
        let now = self.clock.now();
        let hash = Self::hash_token(token);
        let mut entries = self.table();
        let Some(entry) = entries.get_mut(&hash) else {
            return Err(SessionError::Invalid);
        };
        if entry.expires_at <= now {
            entries.remove(&hash);
            return Err(SessionError::Invalid);
        }
        if now > entry.issued_at + self.timeout + self.max_refresh {
            return Err(SessionError::OutsideRenewalWindow);
        }
        entry.expires_at = now + self.timeout;
        Ok(Session {
            token: token.to_string(),
            max_age: self.timeout,
        })
    }

    fn revoke(&self, token: &str) {
        let mut entries = self.table();
        entries.remove(&Self::hash_token(token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test::ManualClock;

    const TIMEOUT: Duration = Duration::from_secs(60);

    fn sessions() -> (BearerSessions, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (BearerSessions::with_clock(TIMEOUT, clock.clone()), clock)
    }

    #[test]
    fn issue_then_extract_round_trips_the_identity() {
        let (sessions, _clock) = sessions();
        let session = sessions.issue("admin");
        assert_eq!(session.max_age, TIMEOUT);
        assert_eq!(
            sessions.extract_identity(&session.token),
            Some("admin".to_string())
        );
    }

    #[test]
    fn tokens_are_unique_and_unguessable_by_tampering() {
        let (sessions, _clock) = sessions();
        let first = sessions.issue("admin");
        let second = sessions.issue("admin");
        assert_ne!(first.token, second.token);
        assert_eq!(sessions.extract_identity("forged-token"), None);
    }

    #[test]
    fn expired_session_is_absent() {
        let (sessions, clock) = sessions();
        let session = sessions.issue("admin");
        clock.advance(TIMEOUT);
        assert_eq!(sessions.extract_identity(&session.token), None);
    }

    #[test]
    fn refresh_inside_the_window_extends_expiry() {
        let (sessions, clock) = sessions();
        let session = sessions.issue("admin");
        clock.advance(TIMEOUT - Duration::from_secs(10));
        let refreshed = sessions.refresh(&session.token);
        assert_eq!(
            refreshed,
            Ok(Session {
                token: session.token.clone(),
                max_age: TIMEOUT,
            })
        );

        // Past the original expiry, but alive thanks to the refresh.
        clock.advance(Duration::from_secs(30));
        assert_eq!(
            sessions.extract_identity(&session.token),
            Some("admin".to_string())
        );
    }

    #[test]
    fn refresh_after_expiry_fails() {
        let (sessions, clock) = sessions();
        let session = sessions.issue("admin");
        clock.advance(TIMEOUT);
        assert_eq!(
            sessions.refresh(&session.token),
            Err(SessionError::Invalid)
        );
    }

    #[test]
    fn refresh_stops_past_the_renewal_window() {
        let (sessions, clock) = sessions();
        let session = sessions.issue("admin");

        // Keep the session alive by refreshing just before each expiry.
        for _ in 0..3 {
            clock.advance(TIMEOUT - Duration::from_secs(1));
            let _ = sessions.refresh(&session.token);
        }

        // Now well past issued_at + timeout + max_refresh.
        assert_eq!(
            sessions.refresh(&session.token),
            Err(SessionError::OutsideRenewalWindow)
        );
    }

    #[test]
    fn revoked_session_cannot_be_extracted_or_refreshed() {
        let (sessions, _clock) = sessions();
        let session = sessions.issue("admin");
        sessions.revoke(&session.token);
        assert_eq!(sessions.extract_identity(&session.token), None);
        assert_eq!(
            sessions.refresh(&session.token),
            Err(SessionError::Invalid)
        );
    }

    #[test]
    fn session_table_survives_a_panicked_lock_holder() {
        let (sessions, _clock) = sessions();
        let sessions = Arc::new(sessions);
        let session = sessions.issue("admin");

        let poisoner = sessions.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().expect("lock");
            panic!("holder dies mid-update");
        })
        .join();
        assert!(result.is_err());

        // The reclaimed table still serves every operation.
        assert_eq!(
            sessions.extract_identity(&session.token),
            Some("admin".to_string())
        );
        assert!(sessions.refresh(&session.token).is_ok());
        sessions.revoke(&session.token);
        assert_eq!(sessions.extract_identity(&session.token), None);
    }

    #[test]
    fn authorize_permits_any_accepted_identity() {
        let (sessions, _clock) = sessions();
        assert!(sessions.authorize("admin"));
        assert!(sessions.authorize("anyone"));
    }
}
