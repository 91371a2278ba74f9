//! Session store error types

use std::fmt;

/// Errors that can occur during session store operations
#[derive(Debug)]
pub enum SessionError {
    /// The store is misconfigured (e.g. `store.ttl` has an unsupported type).
    ///
    /// This is a deployment bug rather than a transient fault; callers should
    /// let it propagate instead of treating it like a failed write.
    Config(String),
    /// Error from the backing key-value store
    StoreError(String),
    /// Error during serialization/deserialization
    SerializationError(String),
    /// Redis error (when redis-store feature is enabled)
    #[cfg(feature = "redis-store")]
    RedisError(redis::RedisError),
}

impl SessionError {
    /// Whether this error comes from configuration rather than I/O
    pub fn is_config_error(&self) -> bool {
        matches!(self, SessionError::Config(_))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SessionError::StoreError(msg) => write!(f, "Backing store error: {}", msg),
            SessionError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            #[cfg(feature = "redis-store")]
            SessionError::RedisError(e) => write!(f, "Redis error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "redis-store")]
            SessionError::RedisError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "redis-store")]
impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::RedisError(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}
