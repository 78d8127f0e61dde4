use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrfError {
    /// The session handed to the guard cannot be used as a key-value mapping.
    #[error("Invalid session type: {0}")]
    InvalidSessionType(String),

    #[error("Missing CSRF token")]
    MissingToken,

    /// Wrong, evicted, or already consumed token.
    #[error("Invalid CSRF token")]
    InvalidToken,

    #[error("Invalid CSRF configuration: {0}")]
    Config(String),

    #[error("Unreadable request body: {0}")]
    Body(String),
}

impl CsrfError {
    /// Conventional HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CsrfError::MissingToken | CsrfError::InvalidToken => 403,
            CsrfError::Body(_) => 400,
            CsrfError::InvalidSessionType(_) | CsrfError::Config(_) => 500,
        }
    }

    /// Whether this error denies a single request, as opposed to a setup
    /// failure of the guard itself.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CsrfError::MissingToken | CsrfError::InvalidToken | CsrfError::Body(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;
