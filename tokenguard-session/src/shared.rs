//! Interior-mutable session handle.

use crate::session::Session;
use crate::store::SessionStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Cloneable handle to one [`Session`].
///
/// Each `get`/`set` takes the lock for the duration of that call only. A
/// read-modify-write sequence built from several calls is not atomic; use
/// [`SharedSession::with`] to hold the lock across the whole sequence.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn id(&self) -> String {
        self.inner.lock().id.clone()
    }

    /// Clone the current session value.
    pub fn snapshot(&self) -> Session {
        self.inner.lock().clone()
    }

    /// Whether two handles point at the same session.
    pub fn ptr_eq(&self, other: &SharedSession) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}

impl SessionStore for SharedSession {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.inner.lock().set(key, value);
    }

    fn has(&self, key: &str) -> bool {
        self.inner.lock().has(key)
    }
}
