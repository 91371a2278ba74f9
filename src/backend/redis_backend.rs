//! Redis backing store
//!
//! Values are stored as JSON strings. Patterns are passed straight to `KEYS`,
//! whose glob syntax matches the pattern contract of [`KeyValueStore`].

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::KeyValueStore;
use crate::error::SessionError;

/// Redis-backed key-value store
///
/// # Example
///
/// ```rust,ignore
/// use eden_session_store::RedisBackend;
///
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let backend = RedisBackend::new(client).await?;
/// ```
#[derive(Clone)]
pub struct RedisBackend {
    conn: Arc<ConnectionManager>,
}

impl RedisBackend {
    /// Create a new Redis backend from a client
    pub async fn new(client: redis::Client) -> Result<Self, SessionError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::from_connection_manager(conn))
    }

    /// Create a new Redis backend from a connection string
    pub async fn from_url(url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(url).map_err(|e| {
            SessionError::StoreError(format!("Failed to create Redis client: {}", e))
        })?;
        Self::new(client).await
    }

    /// Create a new Redis backend from an existing connection manager
    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self {
            conn: Arc::new(conn),
        }
    }

    fn connection(&self) -> ConnectionManager {
        (*self.conn).clone()
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, SessionError> {
        let mut conn = self.connection();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await?;
        Ok(keys)
    }
}

#[async_trait]
impl KeyValueStore for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        let mut conn = self.connection();
        let data: Option<String> = conn.get(key).await?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn get_pattern(&self, pattern: &str) -> Result<BTreeMap<String, Value>, SessionError> {
        let keys = self.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }

        let mut conn = self.connection();
        let values: Vec<Option<String>> = conn.mget(&keys).await?;

        // Keys can expire between KEYS and MGET; those come back as nil
        let mut entries = BTreeMap::new();
        for (key, value) in keys.into_iter().zip(values) {
            if let Some(json) = value {
                entries.insert(key, serde_json::from_str(&json)?);
            }
        }
        Ok(entries)
    }

    async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), SessionError> {
        let mut conn = self.connection();

        if ttl_secs > 0 {
            let json = serde_json::to_string(&value)?;
            conn.set_ex::<_, _, ()>(key, json, ttl_secs).await?;
        } else {
            // SET EX rejects 0; an entry that expires now is simply gone
            conn.del::<_, ()>(key).await?;
        }

        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.connection();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn del_pattern(&self, pattern: &str) -> Result<(), SessionError> {
        let keys = self.keys(pattern).await?;
        if !keys.is_empty() {
            let mut conn = self.connection();
            conn.del::<_, ()>(keys).await?;
        }
        Ok(())
    }
}
