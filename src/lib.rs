// tokenguard - single-use CSRF tokens kept in the caller's session
//
// This crate bundles the guard, the session capability it works against,
// and the logging used by both.

// Re-export the guard at the top level
pub use tokenguard_csrf::*;

// Re-export member crates
pub use tokenguard_csrf as csrf;
pub use tokenguard_log as log;
pub use tokenguard_session as session;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CsrfConfig,
        CsrfError,
        FormRequest,
        ParsedBody,
        ServerRequest,
        TokenGuard,
        TokenList,
        parse_body,
    };

    pub use tokenguard_session::{Session, SessionStore, SharedSession};

    pub use serde_json::{Value, json};
}
