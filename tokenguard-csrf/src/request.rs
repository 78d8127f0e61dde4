//! The slice of an HTTP request the guard looks at.

use crate::error::{CsrfError, Result};
use serde_json::{Map, Value};

/// Request body already decoded into field name / value pairs.
pub type ParsedBody = Map<String, Value>;

/// What the guard needs from the host's request type.
pub trait ServerRequest {
    /// HTTP method exactly as received, e.g. `"POST"`.
    fn method(&self) -> &str;

    /// Decoded body fields, or `None` when the request has no body.
    fn parsed_body(&self) -> Option<&ParsedBody>;
}

impl<R: ServerRequest + ?Sized> ServerRequest for &R {
    fn method(&self) -> &str {
        (**self).method()
    }

    fn parsed_body(&self) -> Option<&ParsedBody> {
        (**self).parsed_body()
    }
}

/// Owned request carrying a method and a parsed form body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormRequest {
    pub method: String,
    pub body: Option<ParsedBody>,
}

impl FormRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            body: None,
        }
    }

    /// Add one body field, creating the body if needed.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Option<ParsedBody>) -> Self {
        self.body = body;
        self
    }

    /// Build from a raw body, decoded with [`parse_body`].
    pub fn from_raw(
        method: impl Into<String>,
        content_type: Option<&str>,
        raw: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            method: method.into(),
            body: parse_body(content_type, raw)?,
        })
    }
}

impl ServerRequest for FormRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn parsed_body(&self) -> Option<&ParsedBody> {
        self.body.as_ref()
    }
}

/// Decode a raw request body into fields.
///
/// Handles JSON objects and `application/x-www-form-urlencoded` bodies. An
/// empty body yields `None`. Without a content type, JSON is tried first and
/// form encoding second.
///
/// ```
/// use tokenguard_csrf::parse_body;
///
/// let body = parse_body(
///     Some("application/x-www-form-urlencoded"),
///     b"_csrf=abc&title=hello",
/// )
/// .unwrap()
/// .unwrap();
/// assert_eq!(body["_csrf"], "abc");
/// ```
pub fn parse_body(content_type: Option<&str>, raw: &[u8]) -> Result<Option<ParsedBody>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let media_type = content_type.map(|ct| {
        ct.split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    });

    match media_type.as_deref() {
        Some("application/json") => parse_json(raw).map(Some),
        Some(mt) if mt.ends_with("+json") => parse_json(raw).map(Some),
        Some("application/x-www-form-urlencoded") => parse_form(raw).map(Some),
        Some(other) => Err(CsrfError::Body(format!(
            "unsupported content type '{}'",
            other
        ))),
        None => parse_json(raw).or_else(|_| parse_form(raw)).map(Some),
    }
}

fn parse_json(raw: &[u8]) -> Result<ParsedBody> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(CsrfError::Body("JSON body is not an object".to_string())),
        Err(e) => Err(CsrfError::Body(e.to_string())),
    }
}

fn parse_form(raw: &[u8]) -> Result<ParsedBody> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(raw).map_err(|e| CsrfError::Body(e.to_string()))?;

    // Repeated fields: the last occurrence wins.
    Ok(pairs
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_request_builder() {
        let req = FormRequest::new("POST")
            .with_field("_csrf", "abc")
            .with_field("count", 3);

        assert_eq!(req.method(), "POST");
        let body = req.parsed_body().unwrap();
        assert_eq!(body["_csrf"], json!("abc"));
        assert_eq!(body["count"], json!(3));
    }

    #[test]
    fn test_form_request_without_body() {
        let req = FormRequest::new("GET");
        assert!(req.parsed_body().is_none());
        assert_eq!((&req).method(), "GET");
    }

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(parse_body(None, b"").unwrap(), None);
        assert_eq!(parse_body(Some("application/json"), b"  \n").unwrap(), None);
    }

    #[test]
    fn test_parse_json_body() {
        let body = parse_body(
            Some("application/json; charset=utf-8"),
            br#"{"_csrf":"abc","n":1}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(body["_csrf"], json!("abc"));
        assert_eq!(body["n"], json!(1));

        let body = parse_body(Some("application/vnd.api+json"), br#"{"a":true}"#)
            .unwrap()
            .unwrap();
        assert_eq!(body["a"], json!(true));
    }

    #[test]
    fn test_parse_json_rejects_non_objects() {
        let err = parse_body(Some("application/json"), b"[1,2]").unwrap_err();
        assert!(matches!(err, CsrfError::Body(_)));

        let err = parse_body(Some("application/json"), b"{not json").unwrap_err();
        assert!(matches!(err, CsrfError::Body(_)));
    }

    #[test]
    fn test_parse_form_body() {
        let body = parse_body(
            Some("Application/X-WWW-Form-Urlencoded"),
            b"_csrf=a%20b&_csrf=last&x=1",
        )
        .unwrap()
        .unwrap();
        assert_eq!(body["_csrf"], json!("last"));
        assert_eq!(body["x"], json!("1"));
    }

    #[test]
    fn test_parse_without_content_type() {
        let body = parse_body(None, br#"{"_csrf":"abc"}"#).unwrap().unwrap();
        assert_eq!(body["_csrf"], json!("abc"));

        let body = parse_body(None, b"_csrf=abc").unwrap().unwrap();
        assert_eq!(body["_csrf"], json!("abc"));
    }

    #[test]
    fn test_unsupported_content_type() {
        let err = parse_body(Some("multipart/form-data; boundary=x"), b"--x").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_from_raw() {
        let req = FormRequest::from_raw("PUT", Some("application/json"), br#"{"k":"v"}"#).unwrap();
        assert_eq!(req.method, "PUT");
        assert_eq!(req.parsed_body().unwrap()["k"], json!("v"));
    }
}
