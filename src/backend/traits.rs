//! Backing key-value store trait

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::SessionError;

/// The key-value service session records are delegated to.
///
/// Patterns use Redis `KEYS` glob syntax (`*`, `?`, `[...]`) and must be
/// supported natively for both reads and deletes.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Get the value stored under `key`, or None if missing/expired
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError>;

    /// Get every live entry whose key matches `pattern`
    async fn get_pattern(&self, pattern: &str) -> Result<BTreeMap<String, Value>, SessionError>;

    /// Store `value` under `key`, expiring after `ttl_secs` seconds.
    ///
    /// A TTL of 0 means the entry is already expired.
    async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), SessionError>;

    /// Delete the entry under `key`; deleting a missing key is not an error
    async fn del(&self, key: &str) -> Result<(), SessionError>;

    /// Delete every entry whose key matches `pattern`
    async fn del_pattern(&self, pattern: &str) -> Result<(), SessionError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        (**self).get(key).await
    }

    async fn get_pattern(&self, pattern: &str) -> Result<BTreeMap<String, Value>, SessionError> {
        (**self).get_pattern(pattern).await
    }

    async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), SessionError> {
        (**self).set(key, value, ttl_secs).await
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        (**self).del(key).await
    }

    async fn del_pattern(&self, pattern: &str) -> Result<(), SessionError> {
        (**self).del_pattern(pattern).await
    }
}
