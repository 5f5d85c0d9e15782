//! External store boundaries: the relational user store and the key-value
//! configuration store.
//!
//! The gate only needs a narrow read/write surface from each; durability and
//! query semantics belong to the implementations. [`postgres`] backs both
//! with `sqlx`, [`memory`] keeps them in process for tests and local runs.

use async_trait::async_trait;

pub mod memory;
pub mod postgres;

/// Reserved bootstrap administrator username.
pub const BOOTSTRAP_USER: &str = "admin";

/// Key-value store key holding the bootstrap administrator password.
pub const ADMIN_PASS_KEY: &str = "admin_pass";

/// Key-value store key holding the display title for the login UI.
pub const LOGIN_TITLE_KEY: &str = "login_title";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("{0}")]
    Other(String),
}

/// Read access to the external user store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up the stored password representation for a username.
    ///
    /// Returns `Ok(None)` when no such user exists. The shape of the stored
    /// value (hashed or not) is the store's concern; the verifier only
    /// compares it for equality.
    async fn find_password(&self, username: &str) -> Result<Option<String>, StoreError>;
}

/// Read/write access to the key-value configuration store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Key under which a given username's password lives in the kv store.
#[must_use]
pub fn password_key(username: &str) -> String {
    format!("{username}_pass")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_key_matches_bootstrap_constant() {
        assert_eq!(password_key(BOOTSTRAP_USER), ADMIN_PASS_KEY);
        assert_eq!(password_key("operator"), "operator_pass");
    }
}
