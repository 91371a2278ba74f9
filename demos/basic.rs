//! Basic walkthrough of the store operations
//!
//! Uses the in-memory backing store by default. Set `REDIS_URL` to run the
//! same steps against Redis.

use eden_session_store::{
    EdenSessionStore, EdenStoreConfig, KeyValueStore, MemoryBackend, SessionData, SessionError,
    SessionStore,
};
use uuid::Uuid;

async fn walkthrough<K: KeyValueStore>(store: EdenSessionStore<K>) -> Result<(), SessionError> {
    let alice = Uuid::new_v4().to_string();
    let bob = Uuid::new_v4().to_string();

    // Cookie valid for 30 minutes
    let mut session = SessionData::with_max_age(30 * 60 * 1000);
    session.set("user", "alice");
    store.set(&alice, &session).await?;

    let mut session = SessionData::with_max_age(30 * 60 * 1000);
    session.set("user", "bob");
    store.set(&bob, &session).await?;

    println!("Stored under {}", store.keys().session_key(&alice));
    println!("TTL for bob: {}s", store.ttl_for(&bob, &session)?);

    match store.get(&alice).await? {
        Some(data) => println!("Loaded alice: {:?}", data.get::<String>("user")),
        None => println!("alice not found"),
    }

    // Refresh expiry
    store.touch(&bob, &session).await?;

    println!("Active sessions: {}", store.length().await?);
    for data in store.all().await? {
        println!("  user = {:?}", data.get::<String>("user"));
    }

    store.destroy(&alice).await?;
    println!("After destroy: {}", store.length().await?);

    store.clear().await?;
    println!("After clear: {}", store.length().await?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), SessionError> {
    // Set up logging
    tracing_subscriber::fmt::init();

    let config = EdenStoreConfig::new().with_prefix("demo");

    #[cfg(feature = "redis-store")]
    if let Ok(url) = std::env::var("REDIS_URL") {
        let backend = eden_session_store::RedisBackend::from_url(&url).await?;
        return walkthrough(EdenSessionStore::new(backend, config)).await;
    }

    walkthrough(EdenSessionStore::new(MemoryBackend::new(), config)).await
}
