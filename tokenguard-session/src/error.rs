//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A value could not be converted into a session value
    #[error("Serialization error for key '{key}': {message}")]
    Serialization { key: String, message: String },

    /// A stored value does not have the requested shape
    #[error("Deserialization error for key '{key}': {message}")]
    Deserialization { key: String, message: String },

    /// A dynamically-typed store is not a key-value mapping
    #[error("Session is not a mapping: found {0}")]
    NotMapping(String),
}
