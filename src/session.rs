//! Session record layout, as written by express-session

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Cookie sub-structure stored with every session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    /// Max age in milliseconds as originally configured
    pub original_max_age: Option<i64>,

    /// Absolute expiry; `None` for a browser-session cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Secure flag
    #[serde(default)]
    pub secure: bool,

    /// HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// Cookie path
    #[serde(default = "default_path")]
    pub path: String,

    /// Cookie domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// `true`, `false` or one of `"strict"`, `"lax"`, `"none"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<Value>,

    /// Cookie attributes not modelled above (e.g. `priority`, `partitioned`),
    /// kept so they survive a read-modify-write
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_http_only() -> bool {
    true
}

fn default_path() -> String {
    "/".to_string()
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self {
            original_max_age: None,
            expires: None,
            secure: false,
            http_only: true,
            path: default_path(),
            domain: None,
            same_site: None,
            extra: HashMap::new(),
        }
    }
}

impl SessionCookie {
    /// Cookie that expires `max_age_ms` milliseconds from now
    pub fn new(max_age_ms: i64) -> Self {
        Self {
            original_max_age: Some(max_age_ms),
            expires: Some(Utc::now() + Duration::milliseconds(max_age_ms)),
            ..Default::default()
        }
    }

    /// Remaining lifetime in milliseconds (`maxAge` in express-session terms).
    ///
    /// Negative once the cookie has expired, `None` for browser-session cookies.
    pub fn max_age(&self) -> Option<i64> {
        self.expires
            .map(|exp| (exp - Utc::now()).num_milliseconds())
    }
}

/// A session record: the cookie plus arbitrary user fields at the same level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Cookie information
    pub cookie: SessionCookie,

    /// User fields, flattened at the same level as `cookie`
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl SessionData {
    /// Create an empty record around the given cookie
    pub fn new(cookie: SessionCookie) -> Self {
        Self {
            cookie,
            data: HashMap::new(),
        }
    }

    /// Create an empty record whose cookie expires `max_age_ms` from now
    pub fn with_max_age(max_age_ms: i64) -> Self {
        Self::new(SessionCookie::new(max_age_ms))
    }

    /// Get a typed value from the record
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the record
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), v);
        }
    }

    /// Encode into the JSON document handed to the backing store
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decode a JSON document read back from the backing store
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
