use crate::config::CsrfConfig;
use crate::error::{CsrfError, Result};
use crate::request::{ParsedBody, ServerRequest};
use crate::token::{TokenList, fingerprint, generate_token_value};
use tokenguard_log::{debug, trace, warn};
use tokenguard_session::SessionStore;

/// Methods that must carry a valid token. Matched case-sensitively.
pub const GUARDED_METHODS: [&str; 3] = ["PUT", "POST", "DELETE"];

/// Whether requests with this method are checked.
pub fn is_guarded_method(method: &str) -> bool {
    GUARDED_METHODS.contains(&method)
}

/// Single-use CSRF token guard over a borrowed session.
///
/// The guard keeps its tokens in the session under
/// [`CsrfConfig::session_key`] and reads submitted tokens from the request
/// body field [`CsrfConfig::field_name`].
///
/// ```
/// use serde_json::Value;
/// use std::collections::HashMap;
/// use tokenguard_csrf::{CsrfError, FormRequest, TokenGuard};
///
/// let mut session: HashMap<String, Value> = HashMap::new();
/// let mut guard = TokenGuard::new(&mut session).unwrap();
///
/// let token = guard.generate_token();
/// let request = FormRequest::new("POST").with_field("_csrf", token.as_str());
///
/// let status = guard.process(&request, |_| 200).unwrap();
/// assert_eq!(status, 200);
///
/// // Tokens are single-use
/// let replay = guard.process(&request, |_| 200);
/// assert_eq!(replay, Err(CsrfError::InvalidToken));
/// ```
pub struct TokenGuard<'s, S: SessionStore + ?Sized> {
    session: &'s mut S,
    config: CsrfConfig,
}

impl<'s, S: SessionStore + ?Sized> TokenGuard<'s, S> {
    /// Create a guard with the default configuration.
    pub fn new(session: &'s mut S) -> Result<Self> {
        Self::with_config(session, CsrfConfig::default())
    }

    /// Create a guard with a custom configuration.
    ///
    /// Fails with [`CsrfError::InvalidSessionType`] if `session` is not a
    /// mapping, otherwise with [`CsrfError::Config`] if `config` is invalid.
    pub fn with_config(session: &'s mut S, config: CsrfConfig) -> Result<Self> {
        session
            .ensure_mapping()
            .map_err(|e| CsrfError::InvalidSessionType(e.to_string()))?;
        config.validate()?;

        Ok(Self { session, config })
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Session key holding the token list.
    pub fn session_key(&self) -> &str {
        &self.config.session_key
    }

    /// Body field expected to carry the token.
    pub fn field_name(&self) -> &str {
        &self.config.field_name
    }

    pub fn limit(&self) -> usize {
        self.config.limit
    }

    /// Read access to the underlying session.
    pub fn session(&self) -> &S {
        &*self.session
    }

    /// Current unconsumed tokens, oldest first.
    pub fn tokens(&self) -> TokenList {
        TokenList::load(&*self.session, &self.config.session_key)
    }

    /// Mint a token, record it in the session and return it.
    ///
    /// When the list grows past the limit the oldest token is evicted.
    pub fn generate_token(&mut self) -> String {
        let token = generate_token_value();
        let key = &self.config.session_key;

        let mut tokens = TokenList::load(&*self.session, key);
        let evicted = tokens.push_bounded(token.clone(), self.config.limit);
        tokens.save(&mut *self.session, key);

        match evicted {
            Some(old) => debug!(
                "issued csrf token {}.., evicted {}.. ({} kept)",
                fingerprint(&token),
                fingerprint(&old),
                tokens.len()
            ),
            None => debug!(
                "issued csrf token {}.. ({} kept)",
                fingerprint(&token),
                tokens.len()
            ),
        }

        token
    }

    /// Check a request's token.
    ///
    /// Methods outside [`GUARDED_METHODS`] always pass. For guarded methods
    /// the body must contain the configured field, and its value must be
    /// one of the session's tokens. On success every list entry equal to
    /// the submitted value is consumed.
    pub fn verify(&mut self, method: &str, body: Option<&ParsedBody>) -> Result<()> {
        if !is_guarded_method(method) {
            trace!("{} request passes without csrf check", method);
            return Ok(());
        }

        let field = &self.config.field_name;
        let Some(submitted) = body.and_then(|fields| fields.get(field)) else {
            warn!("rejected {} request: no '{}' field", method, field);
            return Err(CsrfError::MissingToken);
        };

        let key = &self.config.session_key;
        let mut tokens = TokenList::load(&*self.session, key);

        let token = match submitted.as_str() {
            Some(token) if tokens.contains(token) => token,
            _ => {
                warn!(
                    "rejected {} request: unknown csrf token ({} valid tokens)",
                    method,
                    tokens.len()
                );
                return Err(CsrfError::InvalidToken);
            }
        };

        let consumed = tokens.remove_all(token);
        tokens.save(&mut *self.session, key);
        debug!(
            "consumed csrf token {}.. ({} entries removed, {} left)",
            fingerprint(token),
            consumed,
            tokens.len()
        );

        Ok(())
    }

    /// Verify `request` and, if it passes, hand it to `next`.
    ///
    /// On failure `next` is never called and the error is returned instead.
    pub fn process<R, T, F>(&mut self, request: R, next: F) -> Result<T>
    where
        R: ServerRequest,
        F: FnOnce(R) -> T,
    {
        self.verify(request.method(), request.parsed_body())?;
        Ok(next(request))
    }
}
