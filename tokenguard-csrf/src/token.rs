use rand::RngCore;
use serde_json::Value;
use tokenguard_log::warn;
use tokenguard_session::SessionStore;

/// Random bytes per token. Tokens are hex encoded, so twice as many chars.
pub const TOKEN_BYTES: usize = 16;

/// Generate a fresh token value: 16 bytes from the thread-local CSPRNG,
/// hex encoded.
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Short, log-safe prefix of a token.
pub fn fingerprint(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(idx, _)| idx)
        .unwrap_or(token.len());
    &token[..end]
}

/// Ordered list of unconsumed tokens, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<String>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the list stored under `key`.
    ///
    /// A missing key is an empty list. A value that is not an array is also
    /// treated as empty, and non-string array entries are skipped; the next
    /// write replaces the malformed value.
    pub fn load<S: SessionStore + ?Sized>(store: &S, key: &str) -> Self {
        let tokens = match store.get(key) {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(token) => Some(token),
                    _ => None,
                })
                .collect(),
            Some(_) => {
                warn!("session key '{}' does not hold a token list, resetting", key);
                Vec::new()
            }
        };
        Self { tokens }
    }

    /// Write the list back under `key` as a JSON array of strings.
    pub fn save<S: SessionStore + ?Sized>(&self, store: &mut S, key: &str) {
        let items = self.tokens.iter().cloned().map(Value::String).collect();
        store.set(key, Value::Array(items));
    }

    /// Append `token`. If that takes the list over `limit`, the single oldest
    /// entry is dropped and returned.
    pub fn push_bounded(&mut self, token: String, limit: usize) -> Option<String> {
        self.tokens.push(token);
        if self.tokens.len() > limit {
            Some(self.tokens.remove(0))
        } else {
            None
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Remove every entry equal to `token`, returning how many were removed.
    pub fn remove_all(&mut self, token: &str) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        before - self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }
}

impl From<Vec<String>> for TokenList {
    fn from(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl IntoIterator for TokenList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}
