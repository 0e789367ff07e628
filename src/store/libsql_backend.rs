//! libSQL backend: durable `KvStore` implementation.
//!
//! Supports local file and in-memory databases. Expiry is stored as unix
//! milliseconds; expired rows are invisible to `get` and removed by
//! `purge_expired`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::KvStore;

/// libSQL key-value backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlKv {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlKv {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "KV database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests and cache-only deployments).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Delete expired rows. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let removed = self
            .conn()
            .execute(
                "DELETE FROM kv_entries WHERE expires_at <= ?1",
                params![now_millis()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("purge_expired: {e}")))?;
        if removed > 0 {
            debug!(count = removed, "Purged expired KV entries");
        }
        Ok(removed)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
impl KvStore for LibSqlKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT value FROM kv_entries WHERE key = ?1 AND expires_at > ?2",
                params![key.to_string(), now_millis()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("get row parse: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = now_millis().saturating_add(ttl_millis(ttl));
        self.conn()
            .execute(
                "INSERT INTO kv_entries (key, value, expires_at, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    expires_at = excluded.expires_at,
                    updated_at = excluded.updated_at",
                params![key.to_string(), value.to_string(), expires_at],
            )
            .await
            .map_err(|e| StoreError::Query(format!("set: {e}")))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn()
            .execute(
                "DELETE FROM kv_entries WHERE key = ?1",
                params![key.to_string()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("delete: {e}")))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "libsql"
    }
}
