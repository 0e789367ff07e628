//! `KvStore` trait: the key-value cache seam.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Backend-agnostic key-value store with per-entry TTL.
///
/// Per-key `get`/`set` are atomic; nothing here spans more than one key.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a live value. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value that expires after `ttl`, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Remove a key. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
