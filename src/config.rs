//! Session store configuration

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::session::SessionData;

/// TTL callback: `(store options, session, session ID) -> seconds`
pub type TtlFn = Arc<dyn Fn(&StoreOptions, &SessionData, &str) -> u64 + Send + Sync>;

/// Value of the `store.ttl` option
#[derive(Clone)]
pub enum TtlSetting {
    /// Fixed TTL in seconds
    Seconds(u64),
    /// TTL given as a string literal, e.g. `"3600"`
    Numeric(String),
    /// TTL computed per write
    Computed(TtlFn),
    /// Anything else that was configured. Rejected when a TTL is resolved.
    Unsupported(Value),
}

impl TtlSetting {
    /// Interpret a raw configuration value.
    ///
    /// `null` and `false` leave the option unset. Numbers must be whole and
    /// non-negative; `30.0` is accepted as 30 seconds.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) => Some(match whole_seconds(&n) {
                Some(secs) => TtlSetting::Seconds(secs),
                None => TtlSetting::Unsupported(Value::Number(n)),
            }),
            Value::String(s) => Some(TtlSetting::Numeric(s)),
            other => Some(TtlSetting::Unsupported(other)),
        }
    }

    /// Wrap a closure as a computed TTL
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&StoreOptions, &SessionData, &str) -> u64 + Send + Sync + 'static,
    {
        TtlSetting::Computed(Arc::new(f))
    }
}

fn whole_seconds(n: &serde_json::Number) -> Option<u64> {
    if let Some(secs) = n.as_u64() {
        return Some(secs);
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}

impl fmt::Debug for TtlSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtlSetting::Seconds(secs) => f.debug_tuple("Seconds").field(secs).finish(),
            TtlSetting::Numeric(s) => f.debug_tuple("Numeric").field(s).finish(),
            TtlSetting::Computed(_) => f.write_str("Computed(<fn>)"),
            TtlSetting::Unsupported(v) => f.debug_tuple("Unsupported").field(v).finish(),
        }
    }
}

impl From<u64> for TtlSetting {
    fn from(secs: u64) -> Self {
        TtlSetting::Seconds(secs)
    }
}

impl From<&str> for TtlSetting {
    fn from(s: &str) -> Self {
        TtlSetting::Numeric(s.to_string())
    }
}

impl From<String> for TtlSetting {
    fn from(s: String) -> Self {
        TtlSetting::Numeric(s)
    }
}

fn deserialize_ttl<'de, D>(deserializer: D) -> Result<Option<TtlSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(TtlSetting::from_value(value))
}

/// The `store` section of the configuration
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StoreOptions {
    /// TTL override. When unset, the TTL follows the session cookie.
    #[serde(default, deserialize_with = "deserialize_ttl")]
    pub ttl: Option<TtlSetting>,
}

/// Configuration for [`EdenSessionStore`](crate::EdenSessionStore)
///
/// Fixed for the lifetime of the store it is given to.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EdenStoreConfig {
    /// Namespace prepended to every key (default: none)
    #[serde(default)]
    pub prefix: Option<String>,

    /// The `store` section
    #[serde(default)]
    pub store: StoreOptions,
}

impl EdenStoreConfig {
    /// Empty configuration: no prefix, TTL taken from the cookie
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON document such as `{"prefix": "app", "store": {"ttl": 3600}}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the key namespace
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set `store.ttl`
    pub fn with_ttl(mut self, ttl: impl Into<TtlSetting>) -> Self {
        self.store.ttl = Some(ttl.into());
        self
    }

    /// Set `store.ttl` to a callback
    pub fn with_ttl_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&StoreOptions, &SessionData, &str) -> u64 + Send + Sync + 'static,
    {
        self.store.ttl = Some(TtlSetting::computed(f));
        self
    }
}
