//! Backing key-value stores

mod memory;
mod traits;

pub use memory::MemoryBackend;
pub use traits::KeyValueStore;

#[cfg(feature = "redis-store")]
mod redis_backend;

#[cfg(feature = "redis-store")]
pub use redis_backend::RedisBackend;
