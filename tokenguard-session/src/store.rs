//! The session-store capability.

use crate::error::{SessionError, SessionResult};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Minimal key-value capability a session must offer.
///
/// Anything that can hand out and accept values by string key qualifies:
/// plain maps, a JSON object, a [`Session`](crate::Session), or a
/// [`SharedSession`](crate::SharedSession) handle.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use std::collections::HashMap;
/// use tokenguard_session::SessionStore;
///
/// let mut session: HashMap<String, Value> = HashMap::new();
/// session.set("user_id", json!(42));
///
/// assert!(session.has("user_id"));
/// // `HashMap::get` shadows the trait method, so call it by path
/// assert_eq!(SessionStore::get(&session, "user_id"), Some(json!(42)));
/// assert_eq!(SessionStore::get(&session, "missing"), None);
/// ```
pub trait SessionStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: Value);

    /// Whether a value is stored under `key`.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether this store actually behaves as a mapping.
    ///
    /// Statically-typed maps always do. Dynamically-typed stores such as a
    /// raw [`Value`] only do when they hold an object.
    fn is_mapping(&self) -> bool {
        true
    }

    /// Fail with [`SessionError::NotMapping`] unless [`is_mapping`](Self::is_mapping).
    fn ensure_mapping(&self) -> SessionResult<()> {
        if self.is_mapping() {
            Ok(())
        } else {
            Err(SessionError::NotMapping(self.kind().to_string()))
        }
    }

    /// Short description of the store's shape, used in error messages.
    fn kind(&self) -> &'static str {
        "mapping"
    }
}

impl<H: BuildHasher> SessionStore for HashMap<String, Value, H> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl SessionStore for BTreeMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        BTreeMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl SessionStore for Map<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        Map::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl SessionStore for Value {
    fn get(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(key)).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        // Writes to a non-object are dropped; callers check `is_mapping` first.
        if let Some(map) = self.as_object_mut() {
            map.insert(key.to_string(), value);
        }
    }

    fn has(&self, key: &str) -> bool {
        self.as_object().is_some_and(|map| map.contains_key(key))
    }

    fn is_mapping(&self) -> bool {
        self.is_object()
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "mapping",
        }
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        (**self).set(key, value)
    }

    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }

    fn is_mapping(&self) -> bool {
        (**self).is_mapping()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}
