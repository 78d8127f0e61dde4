//! In-process session value.

use crate::error::{SessionError, SessionResult};
use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokenguard_log::debug;

/// Session data structure.
///
/// Holds the key-value data of one client session plus the metadata a
/// host typically persists alongside it. Loading and saving sessions is the
/// host's business; this type only models the in-memory value handed to
/// request processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Session data as key-value pairs
    pub data: HashMap<String, Value>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last access timestamp
    pub last_accessed_at: DateTime<Utc>,
    /// Session expiration timestamp
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with the given ID and TTL.
    pub fn new(id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data: HashMap::new(),
            created_at: now,
            last_accessed_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or_default(),
        }
    }

    /// Create an empty session with a freshly generated ID.
    pub fn generate(ttl: Duration) -> Self {
        Self::new(generate_session_id(), ttl)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Read a typed value.
    ///
    /// Returns `Ok(None)` when the key is absent and an error when the stored
    /// value does not deserialize into `T`.
    pub fn get_as<T: for<'de> Deserialize<'de>>(&self, key: &str) -> SessionResult<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    debug!("session {}: key '{}' has unexpected shape", self.id, key);
                    SessionError::Deserialization {
                        key: key.to_string(),
                        message: e.to_string(),
                    }
                }),
        }
    }

    /// Store a typed value.
    pub fn set_as<T: Serialize>(&mut self, key: &str, value: T) -> SessionResult<()> {
        let value = serde_json::to_value(value).map_err(|e| SessionError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn keys(&self) -> Vec<&String> {
        self.data.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Update the last accessed timestamp.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Push the expiration out to `ttl` from now.
    pub fn extend(&mut self, ttl: Duration) {
        self.expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();
    }
}

impl SessionStore for Session {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session() {
        let session = Session::new("abc", Duration::from_secs(60));
        assert_eq!(session.id, "abc");
        assert!(session.is_empty());
        assert!(!session.is_expired());
        assert!(session.created_at < session.expires_at);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Session::generate(Duration::from_secs(60));
        let b = Session::generate(Duration::from_secs(60));
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 36);
    }

    #[test]
    fn test_typed_round_trip() {
        let mut session = Session::generate(Duration::from_secs(60));
        session.set_as("tokens", vec!["a", "b"]).unwrap();

        let tokens: Option<Vec<String>> = session.get_as("tokens").unwrap();
        assert_eq!(tokens, Some(vec!["a".to_string(), "b".to_string()]));

        let missing: Option<String> = session.get_as("nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_typed_get_wrong_shape() {
        let mut session = Session::generate(Duration::from_secs(60));
        session.set("count", json!("not a number"));

        let result: SessionResult<Option<u32>> = session.get_as("count");
        assert!(matches!(
            result,
            Err(SessionError::Deserialization { ref key, .. }) if key == "count"
        ));
    }

    #[test]
    fn test_store_impl() {
        let mut session = Session::generate(Duration::from_secs(60));
        session.set("k", json!(1));
        assert!(session.has("k"));
        assert_eq!(session.remove("k"), Some(json!(1)));
        assert!(!session.has("k"));
    }

    #[test]
    fn test_expiry() {
        let mut session = Session::new("abc", Duration::ZERO);
        session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        assert!(session.is_expired());

        session.extend(Duration::from_secs(60));
        assert!(!session.is_expired());
    }
}
