//! TTL resolution for session writes
//!
//! TTLs are always expressed in seconds. Cookie lifetimes (milliseconds) are
//! floor-divided by 1000 before they reach the backing store.

use crate::config::{StoreOptions, TtlSetting};
use crate::error::SessionError;
use crate::session::SessionData;

/// TTL used when neither `store.ttl` nor the cookie says otherwise (one day)
pub const DEFAULT_TTL_SECS: u64 = 86400;

/// Convert a cookie `maxAge` in milliseconds to whole seconds.
///
/// A negative max age (cookie already expired) yields 0.
pub fn ttl_from_max_age(max_age_ms: Option<i64>) -> u64 {
    match max_age_ms {
        Some(ms) => ms.div_euclid(1000).max(0) as u64,
        None => DEFAULT_TTL_SECS,
    }
}

/// Resolves the TTL for a write from the `store` options
#[derive(Clone, Copy, Debug)]
pub struct TtlResolver<'a> {
    options: &'a StoreOptions,
}

impl<'a> TtlResolver<'a> {
    /// Resolver over the given `store` options
    pub fn new(options: &'a StoreOptions) -> Self {
        Self { options }
    }

    /// TTL in seconds for writing `session` under `sid`.
    ///
    /// Fails with [`SessionError::Config`] when `store.ttl` has an unsupported type.
    pub fn resolve(&self, sid: &str, session: &SessionData) -> Result<u64, SessionError> {
        match &self.options.ttl {
            Some(TtlSetting::Seconds(secs)) => Ok(*secs),
            Some(TtlSetting::Numeric(s)) => s.trim().parse::<u64>().map_err(|_| {
                SessionError::Config(format!(
                    "`store.ttl` must be a number or function, got string {:?}",
                    s
                ))
            }),
            Some(TtlSetting::Computed(f)) => Ok(f(self.options, session, sid)),
            Some(TtlSetting::Unsupported(value)) => Err(SessionError::Config(format!(
                "`store.ttl` must be a number or function, got {}",
                value
            ))),
            None => Ok(ttl_from_max_age(session.cookie.max_age())),
        }
    }
}
