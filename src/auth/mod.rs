//! Authentication core: lockout ledger, credential verifier, and the gate
//! that orders them.
//!
//! ## Lockout Ordering
//!
//! Once an address holds a lockout record, the ledger is consulted *before*
//! the password is compared. A locked address therefore never has its
//! password evaluated, and the lock duration is fixed when the third failure
//! lands; later attempts do not extend it.

mod gate;
mod ledger;
mod verifier;

pub use gate::{AuthenticationGate, LoginOutcome};
pub use ledger::{FailureRecord, LockoutLedger, LOCKOUT_WINDOW, MAX_FAILURES};
pub use verifier::{CredentialVerifier, VerifyOutcome};
