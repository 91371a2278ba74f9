//! Session store backed by the eden key-value service
//!
//! Every operation maps onto one or two backing-store calls:
//! - Key: `prefix.session.<sid>` (or `session.<sid>` without a prefix)
//! - Value: the session record as a JSON document
//! - TTL: from `store.ttl`, or the session cookie's remaining max age, in seconds

use async_trait::async_trait;
use std::sync::Arc;

use super::SessionStore;
use crate::backend::KeyValueStore;
use crate::config::EdenStoreConfig;
use crate::error::SessionError;
use crate::keys::SessionKeys;
use crate::session::SessionData;
use crate::ttl::TtlResolver;

/// Session store that delegates all storage to a [`KeyValueStore`]
///
/// The store itself holds no session state; clones share the backing store.
///
/// # Example
///
/// ```rust,ignore
/// use eden_session_store::{EdenSessionStore, EdenStoreConfig, MemoryBackend};
///
/// let config = EdenStoreConfig::new().with_prefix("shop").with_ttl(3600);
/// let store = EdenSessionStore::new(MemoryBackend::new(), config);
/// ```
pub struct EdenSessionStore<K: KeyValueStore> {
    eden: Arc<K>,
    config: Arc<EdenStoreConfig>,
    keys: SessionKeys,
}

impl<K: KeyValueStore> EdenSessionStore<K> {
    /// Create a store that owns its backing store
    pub fn new(eden: K, config: EdenStoreConfig) -> Self {
        Self::from_shared(Arc::new(eden), config)
    }

    /// Create a store over a backing store that is shared with other users
    pub fn from_shared(eden: Arc<K>, config: EdenStoreConfig) -> Self {
        let keys = SessionKeys::new(config.prefix.as_deref());
        Self {
            eden,
            config: Arc::new(config),
            keys,
        }
    }

    /// The configuration the store was built with
    pub fn config(&self) -> &EdenStoreConfig {
        &self.config
    }

    /// The backing store handle
    pub fn eden(&self) -> &K {
        &self.eden
    }

    /// Key builder for this store's namespace
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// TTL in seconds the store would use when writing `session` under `sid`
    pub fn ttl_for(&self, sid: &str, session: &SessionData) -> Result<u64, SessionError> {
        TtlResolver::new(&self.config.store)
            .resolve(sid, session)
            .map_err(|e| {
                tracing::error!("Refusing to write session {}: {}", sid, e);
                e
            })
    }

    async fn write(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        // Resolve first so a misconfigured TTL never reaches the backing store
        let ttl = self.ttl_for(sid, session)?;
        let key = self.keys.session_key(sid);
        let value = session.to_value()?;

        tracing::debug!(key = %key, ttl, "writing session");
        self.eden.set(&key, value, ttl).await
    }
}

impl<K: KeyValueStore> Clone for EdenSessionStore<K> {
    fn clone(&self) -> Self {
        Self {
            eden: Arc::clone(&self.eden),
            config: Arc::clone(&self.config),
            keys: self.keys.clone(),
        }
    }
}

#[async_trait]
impl<K: KeyValueStore> SessionStore for EdenSessionStore<K> {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError> {
        let key = self.keys.session_key(sid);
        tracing::debug!(key = %key, "loading session");

        match self.eden.get(&key).await? {
            Some(value) => Ok(Some(SessionData::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        self.write(sid, session).await
    }

    async fn destroy(&self, sid: &str) -> Result<(), SessionError> {
        let key = self.keys.session_key(sid);
        tracing::debug!(key = %key, "destroying session");
        self.eden.del(&key).await
    }

    async fn touch(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        // No partial update: re-write the record with a fresh TTL
        self.write(sid, session).await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let pattern = self.keys.wildcard();
        tracing::debug!(pattern = %pattern, "clearing sessions");
        self.eden.del_pattern(&pattern).await
    }

    async fn length(&self) -> Result<usize, SessionError> {
        let entries = self.eden.get_pattern(&self.keys.wildcard()).await?;
        Ok(entries.len())
    }

    async fn ids(&self) -> Result<Vec<String>, SessionError> {
        let entries = self.eden.get_pattern(&self.keys.wildcard()).await?;
        Ok(entries
            .keys()
            .filter_map(|key| self.keys.session_id(key))
            .map(str::to_string)
            .collect())
    }

    async fn all(&self) -> Result<Vec<SessionData>, SessionError> {
        let entries = self.eden.get_pattern(&self.keys.wildcard()).await?;

        let sessions = entries
            .into_iter()
            .filter_map(|(key, value)| match SessionData::from_value(value) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Skipping unreadable session record {}: {}", key, e);
                    None
                }
            })
            .collect();

        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::config::TtlSetting;
    use crate::session::SessionCookie;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Get(String),
        GetPattern(String),
        Set(String, Value, u64),
        Del(String),
        DelPattern(String),
    }

    /// Memory backend that records every call it receives
    #[derive(Default)]
    struct RecordingBackend {
        inner: MemoryBackend,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().push(call);
        }
    }

    #[async_trait]
    impl KeyValueStore for RecordingBackend {
        async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
            self.record(Call::Get(key.to_string()));
            self.inner.get(key).await
        }

        async fn get_pattern(&self, pattern: &str) -> Result<BTreeMap<String, Value>, SessionError> {
            self.record(Call::GetPattern(pattern.to_string()));
            self.inner.get_pattern(pattern).await
        }

        async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), SessionError> {
            self.record(Call::Set(key.to_string(), value.clone(), ttl_secs));
            self.inner.set(key, value, ttl_secs).await
        }

        async fn del(&self, key: &str) -> Result<(), SessionError> {
            self.record(Call::Del(key.to_string()));
            self.inner.del(key).await
        }

        async fn del_pattern(&self, pattern: &str) -> Result<(), SessionError> {
            self.record(Call::DelPattern(pattern.to_string()));
            self.inner.del_pattern(pattern).await
        }
    }

    /// Backend whose every call fails, standing in for a dropped connection
    struct FailingBackend;

    #[async_trait]
    impl KeyValueStore for FailingBackend {
        async fn get(&self, _key: &str) -> Result<Option<Value>, SessionError> {
            Err(SessionError::StoreError("connection refused".to_string()))
        }

        async fn get_pattern(&self, _pattern: &str) -> Result<BTreeMap<String, Value>, SessionError> {
            Err(SessionError::StoreError("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: Value, _ttl_secs: u64) -> Result<(), SessionError> {
            Err(SessionError::StoreError("connection refused".to_string()))
        }

        async fn del(&self, _key: &str) -> Result<(), SessionError> {
            Err(SessionError::StoreError("connection refused".to_string()))
        }

        async fn del_pattern(&self, _pattern: &str) -> Result<(), SessionError> {
            Err(SessionError::StoreError("connection refused".to_string()))
        }
    }

    fn session_for(user: &str) -> SessionData {
        let mut data = SessionData::with_max_age(3_600_000);
        data.set("user", user);
        data
    }

    #[tokio::test]
    async fn test_eden_store_round_trip() {
        let store = EdenSessionStore::new(MemoryBackend::new(), EdenStoreConfig::new());
        let data = session_for("alice");

        assert_ok!(store.set("sid-1", &data).await);

        let retrieved = assert_ok!(store.get("sid-1").await);
        assert_eq!(retrieved, Some(data));

        assert_ok!(store.destroy("sid-1").await);
        assert_eq!(assert_ok!(store.get("sid-1").await), None);
    }

    #[tokio::test]
    async fn test_missing_session_is_not_an_error() {
        let store = EdenSessionStore::new(MemoryBackend::new(), EdenStoreConfig::new());
        assert_eq!(assert_ok!(store.get("nope").await), None);
    }

    #[tokio::test]
    async fn test_same_key_for_every_single_record_operation() {
        for prefix in [None, Some("shop")] {
            let mut config = EdenStoreConfig::new();
            config.prefix = prefix.map(str::to_string);
            let backend = Arc::new(RecordingBackend::default());
            let store = EdenSessionStore::from_shared(Arc::clone(&backend), config);

            let data = session_for("alice");
            store.set("abc", &data).await.unwrap();
            store.get("abc").await.unwrap();
            store.destroy("abc").await.unwrap();

            let expected = match prefix {
                Some(p) => format!("{}.session.abc", p),
                None => "session.abc".to_string(),
            };
            let calls = backend.calls();
            assert_eq!(calls.len(), 3);
            assert!(matches!(&calls[0], Call::Set(key, _, _) if *key == expected));
            assert_eq!(calls[1], Call::Get(expected.clone()));
            assert_eq!(calls[2], Call::Del(expected));
        }
    }

    #[tokio::test]
    async fn test_fixed_ttl_is_passed_through() {
        let backend = Arc::new(RecordingBackend::default());
        let config = EdenStoreConfig::new().with_ttl(120);
        let store = EdenSessionStore::from_shared(Arc::clone(&backend), config);

        store.set("abc", &session_for("alice")).await.unwrap();
        assert!(matches!(&backend.calls()[0], Call::Set(_, _, 120)));
    }

    #[tokio::test]
    async fn test_computed_ttl_is_passed_through() {
        let backend = Arc::new(RecordingBackend::default());
        let config = EdenStoreConfig::new().with_ttl_fn(|_, _, _| 5);
        let store = EdenSessionStore::from_shared(Arc::clone(&backend), config);

        store.set("abc", &session_for("alice")).await.unwrap();
        assert!(matches!(&backend.calls()[0], Call::Set(_, _, 5)));
    }

    #[tokio::test]
    async fn test_ttl_follows_cookie_by_default() {
        let backend = Arc::new(RecordingBackend::default());
        let store = EdenSessionStore::from_shared(Arc::clone(&backend), EdenStoreConfig::new());

        store
            .set("short", &SessionData::with_max_age(30_500))
            .await
            .unwrap();
        store
            .set("browser", &SessionData::new(SessionCookie::default()))
            .await
            .unwrap();

        let calls = backend.calls();
        assert!(matches!(&calls[0], Call::Set(_, _, 30)));
        assert!(matches!(&calls[1], Call::Set(_, _, 86400)));
    }

    #[tokio::test]
    async fn test_misconfigured_ttl_aborts_before_write() {
        let backend = Arc::new(RecordingBackend::default());
        let mut config = EdenStoreConfig::new();
        config.store.ttl = TtlSetting::from_value(json!({}));
        let store = EdenSessionStore::from_shared(Arc::clone(&backend), config);

        let err = assert_err!(store.set("abc", &session_for("alice")).await);
        assert!(err.is_config_error());

        let err = assert_err!(store.touch("abc", &session_for("alice")).await);
        assert!(err.is_config_error());

        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_non_write_operations_ignore_ttl_config() {
        let mut config = EdenStoreConfig::new();
        config.store.ttl = TtlSetting::from_value(json!(true));
        let store = EdenSessionStore::new(MemoryBackend::new(), config);

        assert_ok!(store.get("abc").await);
        assert_ok!(store.destroy("abc").await);
        assert_ok!(store.all().await);
        assert_ok!(store.length().await);
        assert_ok!(store.clear().await);
    }

    #[tokio::test]
    async fn test_touch_writes_like_set() {
        let set_backend = Arc::new(RecordingBackend::default());
        let touch_backend = Arc::new(RecordingBackend::default());
        let config = EdenStoreConfig::new().with_prefix("app").with_ttl(60);

        let set_store = EdenSessionStore::from_shared(Arc::clone(&set_backend), config.clone());
        let touch_store = EdenSessionStore::from_shared(Arc::clone(&touch_backend), config);

        let data = session_for("alice");
        set_store.set("abc", &data).await.unwrap();
        touch_store.touch("abc", &data).await.unwrap();

        assert_eq!(set_backend.calls(), touch_backend.calls());
        assert_eq!(
            set_store.get("abc").await.unwrap(),
            touch_store.get("abc").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_all_length_and_clear() {
        let store = EdenSessionStore::new(
            MemoryBackend::new(),
            EdenStoreConfig::new().with_prefix("app"),
        );

        store.set("a", &session_for("alice")).await.unwrap();
        store.set("b", &session_for("bob")).await.unwrap();

        let all = assert_ok!(store.all().await);
        assert_eq!(all.len(), 2);
        let mut users: Vec<String> = all
            .iter()
            .filter_map(|s| s.get::<String>("user"))
            .collect();
        users.sort();
        assert_eq!(users, vec!["alice", "bob"]);

        assert_eq!(assert_ok!(store.length().await), 2);

        let mut ids = assert_ok!(store.ids().await);
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);

        assert_ok!(store.clear().await);
        assert_eq!(assert_ok!(store.length().await), 0);
        assert!(assert_ok!(store.all().await).is_empty());
    }

    #[tokio::test]
    async fn test_prefixes_do_not_overlap() {
        let backend = Arc::new(MemoryBackend::new());
        let shop = EdenSessionStore::from_shared(
            Arc::clone(&backend),
            EdenStoreConfig::new().with_prefix("shop"),
        );
        let bare = EdenSessionStore::from_shared(Arc::clone(&backend), EdenStoreConfig::new());

        shop.set("a", &session_for("alice")).await.unwrap();
        bare.set("a", &session_for("bob")).await.unwrap();

        assert_eq!(shop.length().await.unwrap(), 1);
        assert_eq!(bare.length().await.unwrap(), 1);

        shop.clear().await.unwrap();
        assert_eq!(shop.length().await.unwrap(), 0);
        assert!(bare.get("a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_all_skips_unreadable_records() {
        let backend = Arc::new(MemoryBackend::new());
        let store = EdenSessionStore::from_shared(Arc::clone(&backend), EdenStoreConfig::new());

        store.set("good", &session_for("alice")).await.unwrap();
        backend
            .set("session.bad", json!("not a session"), 60)
            .await
            .unwrap();

        assert_eq!(store.all().await.unwrap().len(), 1);
        assert_eq!(store.length().await.unwrap(), 2);

        let err = assert_err!(store.get("bad").await);
        assert!(matches!(err, SessionError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_express_records_pass_through_unchanged() {
        let backend = Arc::new(MemoryBackend::new());
        let store = EdenSessionStore::from_shared(Arc::clone(&backend), EdenStoreConfig::new());

        let record = json!({
            "cookie": {
                "originalMaxAge": 60000,
                "expires": "2030-01-01T00:00:00Z",
                "secure": false,
                "httpOnly": true,
                "path": "/",
                "sameSite": true,
                "priority": "high",
                "partitioned": true
            },
            "user": "x"
        });
        backend.set("session.x", record.clone(), 60).await.unwrap();

        let session = assert_ok!(store.get("x").await).unwrap();
        assert_eq!(assert_ok!(store.all().await).len(), 1);

        assert_ok!(store.touch("x", &session).await);
        assert_eq!(backend.get("session.x").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_full_operation_set_through_trait_object() {
        let store: Arc<dyn SessionStore> = Arc::new(EdenSessionStore::new(
            MemoryBackend::new(),
            EdenStoreConfig::new().with_prefix("app"),
        ));

        store.set("a", &session_for("alice")).await.unwrap();
        store.touch("a", &session_for("alice")).await.unwrap();

        assert_eq!(store.length().await.unwrap(), 1);
        assert_eq!(store.ids().await.unwrap(), vec!["a"]);
        assert_eq!(store.all().await.unwrap().len(), 1);

        store.clear().await.unwrap();
        assert_eq!(store.length().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_backend_failures_propagate() {
        let store = EdenSessionStore::new(FailingBackend, EdenStoreConfig::new());
        let data = session_for("alice");

        for err in [
            store.get("a").await.unwrap_err(),
            store.set("a", &data).await.unwrap_err(),
            store.touch("a", &data).await.unwrap_err(),
            store.destroy("a").await.unwrap_err(),
            store.all().await.unwrap_err(),
            store.clear().await.unwrap_err(),
            store.length().await.unwrap_err(),
        ] {
            assert!(matches!(err, SessionError::StoreError(_)));
            assert!(!err.is_config_error());
        }
    }

    #[tokio::test]
    async fn test_concurrent_writes_on_distinct_ids() {
        let store = EdenSessionStore::new(MemoryBackend::new(), EdenStoreConfig::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let sid = format!("sid-{}", i);
                    store.set(&sid, &session_for(&sid)).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.length().await.unwrap(), 16);
    }
}
