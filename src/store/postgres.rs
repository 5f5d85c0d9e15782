//! `PostgreSQL`-backed user and key-value stores.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::{KvStore, StoreError, UserStore};

/// Create the tables the stores expect, if they are missing.
///
/// # Errors
/// Returns an error if the DDL statements fail.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    let span = tracing::info_span!("db.query", db.system = "postgresql", db.operation = "CREATE");
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .instrument(span)
    .await?;

    let span = tracing::info_span!("db.query", db.system = "postgresql", db.operation = "CREATE");
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .instrument(span)
    .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_password(&self, username: &str) -> Result<Option<String>, StoreError> {
        let query = "SELECT password FROM users WHERE username = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| row.get("password")))
    }
}

#[derive(Debug, Clone)]
pub struct PgKvStore {
    pool: PgPool,
}

impl PgKvStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvStore for PgKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let query = "SELECT value FROM kv WHERE key = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(key)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO kv (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }
}
