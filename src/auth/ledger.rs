//! In-memory failure ledger keyed by client address.
//!
//! Each entry carries a failure count and an expiry. Entries are created on
//! the first failure, re-armed on every failure below [`MAX_FAILURES`], and
//! frozen once the count reaches the limit: from that point the only exit is
//! TTL expiry. Expiry is lazy; any access that finds an expired entry treats
//! it as absent and drops it.
//!
//! A single mutex guards the whole table. The table holds one entry per
//! currently-failing address, so contention is not a concern, and it makes
//! every ledger operation atomic: concurrent failures for one address never
//! lose increments and the count is never observable outside `1..=3`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

/// Failures after which an address is locked.
pub const MAX_FAILURES: u8 = 3;

/// Rolling lockout window, re-armed on each failure below the limit.
pub const LOCKOUT_WINDOW: Duration = Duration::from_secs(30 * 60);

/// One address's failure state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureRecord {
    pub count: u8,
    pub expires_at: Instant,
}

pub struct LockoutLedger {
    entries: Mutex<HashMap<String, FailureRecord>>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for LockoutLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LockoutLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(LOCKOUT_WINDOW, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window,
            clock,
        }
    }

    /// True iff a live (non-expired) record exists for the identifier.
    pub fn exists(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    // A panicked holder must not wedge every later login; the map is left
    // consistent by every operation, so a poisoned lock is safe to reclaim.
    fn table(&self) -> MutexGuard<'_, HashMap<String, FailureRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current record for the identifier, dropping it first if expired.
    pub fn get(&self, identifier: &str) -> Option<FailureRecord> {
        let now = self.clock.now();
        let mut entries = self.table();
        Self::prune(&mut entries, identifier, now);
        entries.get(identifier).cloned()
    }

    /// Record a failed attempt and return the resulting count.
    ///
    /// Inserts at count 1, or increments and re-arms the window while the
    /// count is below [`MAX_FAILURES`]. Once locked this is a no-op; the
    /// gate rejects locked identifiers before recording, so reaching that
    /// branch only happens if a caller raced the lock into place.
    pub fn record_failure(&self, identifier: &str) -> u8 {
        let now = self.clock.now();
        let mut entries = self.table();
        Self::prune(&mut entries, identifier, now);
        match entries.get_mut(identifier) {
            Some(record) if record.count >= MAX_FAILURES => record.count,
            Some(record) => {
                record.count += 1;
                record.expires_at = now + self.window;
                record.count
            }
            None => {
                entries.insert(
                    identifier.to_string(),
                    FailureRecord {
                        count: 1,
                        expires_at: now + self.window,
                    },
                );
                1
            }
        }
    }

    /// Delete the record, if any. Called on success while unlocked.
    pub fn clear(&self, identifier: &str) {
        self.table().remove(identifier);
    }

    fn prune(entries: &mut HashMap<String, FailureRecord>, identifier: &str, now: Instant) {
        if let Some(record) = entries.get(identifier) {
            if record.expires_at <= now {
                entries.remove(identifier);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table().len()
    }
}
