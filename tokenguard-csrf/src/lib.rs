//! # tokenguard CSRF protection
//!
//! Session-backed, single-use anti-forgery tokens (synchronizer token
//! pattern).
//!
//! ## Features
//!
//! - ✅ **Single-use tokens** - A token is consumed by the request it protects
//! - ✅ **Bounded storage** - At most `limit` tokens per session, oldest evicted first
//! - ✅ **Any session** - Works with any [`SessionStore`](tokenguard_session::SessionStore)
//! - ✅ **Configurable** - Limit, session key, form field; env and TOML loading
//! - ✅ **Body parsing** - JSON and urlencoded bodies via [`parse_body`]
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::Value;
//! use std::collections::HashMap;
//! use tokenguard_csrf::{CsrfConfig, TokenGuard};
//!
//! let mut session: HashMap<String, Value> = HashMap::new();
//! let config = CsrfConfig::new().with_limit(20);
//! let mut guard = TokenGuard::with_config(&mut session, config).unwrap();
//!
//! // Render this into a hidden `_csrf` form field
//! let token = guard.generate_token();
//! assert_eq!(token.len(), 32);
//! ```
//!
//! ## Verification
//!
//! Only `PUT`, `POST` and `DELETE` are checked. Everything else passes.
//!
//! ```rust
//! use serde_json::Value;
//! use std::collections::HashMap;
//! use tokenguard_csrf::{CsrfError, FormRequest, TokenGuard};
//!
//! let mut session: HashMap<String, Value> = HashMap::new();
//! let mut guard = TokenGuard::new(&mut session).unwrap();
//!
//! // Safe methods pass without a token
//! assert!(guard.verify("GET", None).is_ok());
//!
//! // Unsafe methods need one
//! assert_eq!(guard.verify("POST", None), Err(CsrfError::MissingToken));
//!
//! let forged = FormRequest::new("POST").with_field("_csrf", "guessed");
//! assert_eq!(guard.process(forged, |_| ()), Err(CsrfError::InvalidToken));
//! ```
//!
//! ## Usage in a request handler
//!
//! ```ignore
//! fn submit(session: &mut Session, raw: &[u8], content_type: Option<&str>) -> Response {
//!     let request = FormRequest::from_raw("POST", content_type, raw)?;
//!     let mut guard = TokenGuard::new(session)?;
//!
//!     match guard.process(request, handle_submit) {
//!         Ok(response) => response,
//!         Err(e) => Response::status(e.status_code()),
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod request;
pub mod token;

pub use config::CsrfConfig;
pub use error::{CsrfError, Result};
pub use guard::{GUARDED_METHODS, TokenGuard, is_guarded_method};
pub use request::{FormRequest, ParsedBody, ServerRequest, parse_body};
pub use token::{TokenList, generate_token_value};
