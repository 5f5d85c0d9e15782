//! In-memory store implementations for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{KvStore, StoreError, UserStore};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, String>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, username: &str, password: &str) {
        let mut users = self.users.lock().expect("user store poisoned");
        users.insert(username.to_string(), password.to_string());
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_password(&self, username: &str) -> Result<Option<String>, StoreError> {
        let users = self.users.lock().expect("user store poisoned");
        Ok(users.get(username).cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().expect("kv store poisoned");
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("kv store poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
