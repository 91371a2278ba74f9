//! In-memory backing store
//!
//! This is primarily for development and testing.
//! For production, use RedisBackend or another shared key-value service.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::KeyValueStore;
use crate::error::SessionError;

// Caps TTLs so `Instant` arithmetic cannot overflow (~100 years)
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 3600;

struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

fn compile(pattern: &str) -> Result<glob::Pattern, SessionError> {
    glob::Pattern::new(pattern).map_err(|e| {
        SessionError::StoreError(format!("Invalid key pattern {:?}: {}", pattern, e))
    })
}

/// In-memory key-value store with per-entry expiry and glob patterns
///
/// Clones share the same underlying map.
///
/// Warning: not suitable for production use because:
/// - Entries are lost on server restart
/// - Entries are not shared across multiple server instances
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryBackend {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, entry| entry.is_live(now));
    }

    /// Number of entries held, expired or not
    #[cfg(test)]
    fn raw_len(&self) -> usize {
        self.entries.read().len()
    }

    /// Remaining lifetime of the entry under `key`
    #[cfg(test)]
    pub(crate) fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }
}

#[async_trait]
impl KeyValueStore for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn get_pattern(&self, pattern: &str) -> Result<BTreeMap<String, Value>, SessionError> {
        let pattern = compile(pattern)?;
        self.cleanup_expired();
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .filter(|(key, _)| pattern.matches(key))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), SessionError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + Duration::from_secs(ttl_secs.min(MAX_TTL_SECS)),
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn del_pattern(&self, pattern: &str) -> Result<(), SessionError> {
        let pattern = compile(pattern)?;
        self.entries.write().retain(|key, _| !pattern.matches(key));
        Ok(())
    }
}
