//! Session store trait

use async_trait::async_trait;
use crate::error::SessionError;
use crate::session::SessionData;

/// Storage interface expected by express-session style middleware
///
/// The store owns expiry: `set` and `touch` decide the TTL of the record from
/// the store's own configuration and the session cookie.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Get a session by ID
    ///
    /// Returns None if session doesn't exist
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError>;

    /// Set/update a session
    async fn set(&self, sid: &str, session: &SessionData) -> Result<(), SessionError>;

    /// Destroy/delete a session
    async fn destroy(&self, sid: &str) -> Result<(), SessionError>;

    /// Touch a session - refresh its TTL
    ///
    /// This is called when the session is accessed but not modified
    async fn touch(&self, sid: &str, session: &SessionData) -> Result<(), SessionError>;

    /// Clear all sessions
    async fn clear(&self) -> Result<(), SessionError>;

    /// Get the count of all sessions
    async fn length(&self) -> Result<usize, SessionError>;

    /// Get all session IDs
    async fn ids(&self) -> Result<Vec<String>, SessionError>;

    /// Get all sessions
    async fn all(&self) -> Result<Vec<SessionData>, SessionError>;
}
