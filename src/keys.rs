//! Backing-store key layout
//!
//! Session records live under `<prefix>.session.<sid>`, or `session.<sid>` when
//! no prefix is configured. `<prefix>.session.*` addresses all of them.

const SESSION_SEGMENT: &str = "session.";
const WILDCARD: &str = "*";

/// Builds namespaced keys for a fixed prefix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionKeys {
    namespace: String,
}

impl SessionKeys {
    /// An empty prefix is the same as no prefix.
    pub fn new(prefix: Option<&str>) -> Self {
        let namespace = match prefix {
            Some(p) if !p.is_empty() => format!("{}.{}", p, SESSION_SEGMENT),
            _ => SESSION_SEGMENT.to_string(),
        };
        Self { namespace }
    }

    /// Key of a single session record. `sid` is used as-is.
    pub fn session_key(&self, sid: &str) -> String {
        format!("{}{}", self.namespace, sid)
    }

    /// Pattern matching every session record in the namespace
    pub fn wildcard(&self) -> String {
        format!("{}{}", self.namespace, WILDCARD)
    }

    /// Recover the session ID from a full key, if it belongs to this namespace
    pub fn session_id<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.namespace.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_without_prefix() {
        let keys = SessionKeys::new(None);
        assert_eq!(keys.session_key("abc"), "session.abc");
        assert_eq!(keys.wildcard(), "session.*");
    }

    #[test]
    fn test_keys_with_prefix() {
        let keys = SessionKeys::new(Some("shop"));
        assert_eq!(keys.session_key("abc"), "shop.session.abc");
        assert_eq!(keys.wildcard(), "shop.session.*");
    }

    #[test]
    fn test_empty_prefix_is_no_prefix() {
        assert_eq!(SessionKeys::new(Some("")), SessionKeys::new(None));
    }

    #[test]
    fn test_session_id_round_trip() {
        let keys = SessionKeys::new(Some("shop"));
        let key = keys.session_key("abc.def");
        assert_eq!(keys.session_id(&key), Some("abc.def"));
        assert_eq!(keys.session_id("other.session.abc"), None);
    }
}
