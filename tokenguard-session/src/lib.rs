//! Session capability for tokenguard.
//!
//! The guard never loads or saves sessions itself. It only needs to read and
//! write values by key inside whatever session object the host already has
//! for the current request. This crate defines that capability
//! ([`SessionStore`]) and implements it for the usual suspects:
//!
//! - `HashMap<String, Value>` and `BTreeMap<String, Value>`
//! - `serde_json::Map<String, Value>`
//! - `serde_json::Value` (a mapping only when it holds an object)
//! - [`Session`], an in-memory session value with expiry metadata
//! - [`SharedSession`], a cloneable, lock-protected handle to a `Session`
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use std::time::Duration;
//! use tokenguard_session::{Session, SessionStore, SharedSession};
//!
//! let mut session = Session::generate(Duration::from_secs(3600));
//! session.set_as("user_id", 123).unwrap();
//! assert_eq!(session.get_as::<i32>("user_id").unwrap(), Some(123));
//!
//! let shared = SharedSession::new(session);
//! let mut handle = shared.clone();
//! handle.set("theme", json!("dark"));
//! assert!(shared.has("theme"));
//! ```

pub mod error;
pub mod session;
pub mod shared;
pub mod store;

pub use error::{SessionError, SessionResult};
pub use session::{Session, generate_session_id};
pub use shared::SharedSession;
pub use store::SessionStore;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::session::{Session, generate_session_id};
    pub use crate::shared::SharedSession;
    pub use crate::store::SessionStore;
}
