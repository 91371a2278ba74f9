//! # eden-session-store
//!
//! Express-session compatible session store that keeps session records in the
//! eden key-value service.
//!
//! The store itself is a thin translation layer: it namespaces keys, works out
//! a TTL for every write and hands everything else to a [`KeyValueStore`].
//!
//! ## Features
//!
//! - **Namespaced keys**: records live under `<prefix>.session.<sid>`
//! - **Configurable expiry**: fixed TTL, a per-write callback, or the session cookie's max age
//! - **Pluggable backing stores**: Redis, memory, or anything implementing [`KeyValueStore`]
//! - **Full store interface**: get, set, touch, destroy, all, clear, length and ids
//!
//! TTLs are always handed to the backing store in seconds.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eden_session_store::{EdenSessionStore, EdenStoreConfig, MemoryBackend, SessionData, SessionStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = EdenStoreConfig::new().with_prefix("shop");
//!     let store = EdenSessionStore::new(MemoryBackend::new(), config);
//!
//!     let mut session = SessionData::with_max_age(60_000);
//!     session.set("views", 1);
//!
//!     store.set("sid", &session).await.unwrap();
//!     assert_eq!(store.get("sid").await.unwrap(), Some(session));
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod keys;
pub mod session;
pub mod store;
pub mod ttl;

pub use backend::{KeyValueStore, MemoryBackend};
pub use config::{EdenStoreConfig, StoreOptions, TtlSetting};
pub use error::SessionError;
pub use session::{SessionCookie, SessionData};
pub use store::{EdenSessionStore, SessionStore};

#[cfg(feature = "redis-store")]
pub use backend::RedisBackend;
