//! # Wicket (Admin Authentication Gate)
//!
//! `wicket` gates access to an administrative service. It verifies submitted
//! credentials, defends against credential guessing with a per-address
//! lockout window, and on success mints a bearer session with renewal and
//! revocation support.
//!
//! ## Lockout Model
//!
//! Failed logins are tracked per originating address in an in-memory
//! [`auth::LockoutLedger`]. Three failures inside a rolling 30-minute window
//! lock the address; while locked, submitted passwords are never evaluated
//! and the lock expires only when the window armed by the third failure
//! elapses.
//!
//! - **Per-attempt re-arm:** Each failure below the lock threshold restarts
//!   the 30-minute window.
//! - **Process-local state:** The ledger is not shared across instances and
//!   is dropped on restart. Horizontally scaled deployments get independent
//!   lockout state per instance.
//!
//! ## Bootstrap Identity
//!
//! The reserved `admin` account is not a row in the user store; its password
//! lives in a key-value store under `admin_pass`. An unset `admin_pass`
//! signals a fresh installation, which the API reports distinctly from an
//! authentication failure.
//!
//! ## Sessions
//!
//! Accepted logins are handed to a [`session::SessionBoundary`] implementor.
//! The bundled issuer keeps opaque bearer tokens in memory, hashed with
//! SHA-256, with a renewal window equal to the session timeout.

pub mod api;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
