use crate::error::{CsrfError, Result};
use serde::{Deserialize, Serialize};

/// Default number of tokens kept per session.
pub const DEFAULT_LIMIT: usize = 50;

/// Default session key holding the token list.
pub const DEFAULT_SESSION_KEY: &str = "csrf.tokens";

/// Default form field carrying the submitted token.
pub const DEFAULT_FIELD_NAME: &str = "_csrf";

/// Default prefix for [`CsrfConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "TOKENGUARD_CSRF";

/// CSRF guard configuration
///
/// Deserializes with every field optional, so it can be embedded in a host
/// application's own config file:
///
/// ```
/// use tokenguard_csrf::CsrfConfig;
///
/// let config = CsrfConfig::from_toml_str("limit = 10").unwrap();
/// assert_eq!(config.limit, 10);
/// assert_eq!(config.field_name, "_csrf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Maximum number of unconsumed tokens kept in the session
    pub limit: usize,

    /// Session key under which the token list is stored
    pub session_key: String,

    /// Request body field expected to carry the token
    pub field_name: String,
}

impl CsrfConfig {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
        }
    }

    /// Set the token limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the session key
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// Set the form field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Check the configuration can back a working guard.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(CsrfError::Config(
                "Token limit must be at least 1".to_string(),
            ));
        }
        if self.session_key.is_empty() {
            return Err(CsrfError::Config("Session key must not be empty".to_string()));
        }
        if self.field_name.is_empty() {
            return Err(CsrfError::Config("Field name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load from `TOKENGUARD_CSRF_LIMIT`, `TOKENGUARD_CSRF_SESSION_KEY` and
    /// `TOKENGUARD_CSRF_FIELD_NAME`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Like [`from_env`](Self::from_env) with a custom variable prefix.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        Self::from_vars(prefix, |name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup, e.g. a parsed `.env` file.
    pub fn from_vars<F>(prefix: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}_{}", prefix, suffix));
        let mut config = Self::new();

        if let Some(raw) = var("LIMIT") {
            config.limit = raw.trim().parse().map_err(|_| {
                CsrfError::Config(format!("{}_LIMIT is not a number: '{}'", prefix, raw))
            })?;
        }
        if let Some(key) = var("SESSION_KEY") {
            config.session_key = key;
        }
        if let Some(name) = var("FIELD_NAME") {
            config.field_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML document with top-level `limit`, `session_key` and
    /// `field_name` keys.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| CsrfError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self::new()
    }
}
