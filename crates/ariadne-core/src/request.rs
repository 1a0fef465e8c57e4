//! Request shapes flowing into and out of the router.
//!
//! [`RawRequest`] is the framework-neutral request the caller hands in.
//! [`ParsedRequest`] is what the router produces from it: lowercased
//! method and header names, a normalised path, and structured parameter
//! maps ready for schema validation.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// A map of parameter names to JSON values.
pub type ParamMap = Map<String, Value>;

/// A raw header value: one string or a list of repeated values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// A single header line.
    Single(String),
    /// A header that appeared several times.
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Returns the first value.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v),
            Self::Multiple(vs) => vs.first().map(String::as_str),
        }
    }

    /// Converts into a JSON value (string or array of strings).
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(v) => Value::String(v.clone()),
            Self::Multiple(vs) => Value::Array(vs.iter().cloned().map(Value::String).collect()),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                *self = Self::Multiple(vec![std::mem::take(existing), value]);
            }
            Self::Multiple(vs) => vs.push(value),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// The query part of a raw request.
#[derive(Debug, Clone, PartialEq)]
pub enum RawQuery {
    /// Already parsed by the caller's framework.
    Parsed(ParamMap),
    /// A raw query string, with or without the leading `?`.
    Raw(String),
}

/// The body of a raw request.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// Unparsed text. JSON is detected and decoded during parsing.
    Text(String),
    /// An already structured value.
    Json(Value),
}

/// A framework-neutral inbound request.
///
/// # Example
///
/// ```
/// use ariadne_core::RawRequest;
/// use serde_json::json;
///
/// let request = RawRequest::new("POST", "/pets?dry=true")
///     .header("Content-Type", "application/json")
///     .json(json!({ "name": "Garfield" }));
///
/// assert_eq!(request.method, "POST");
/// assert!(request.body.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    /// HTTP method in any case.
    pub method: String,
    /// Request path, possibly including a query string.
    pub path: String,
    /// Headers as received.
    pub headers: IndexMap<String, HeaderValue>,
    /// Explicit query, overriding any query string on `path`.
    pub query: Option<RawQuery>,
    /// Request body.
    pub body: Option<RawBody>,
}

impl RawRequest {
    /// Creates a request with no headers, query or body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: IndexMap::new(),
            query: None,
            body: None,
        }
    }

    /// Adds a header. A repeated name accumulates values.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.headers.get_mut(&name) {
            Some(existing) => existing.push(value),
            None => {
                self.headers.insert(name, HeaderValue::Single(value));
            }
        }
        self
    }

    /// Sets a raw query string.
    #[must_use]
    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.query = Some(RawQuery::Raw(query.into()));
        self
    }

    /// Sets a pre-parsed query map.
    #[must_use]
    pub fn query_map(mut self, query: ParamMap) -> Self {
        self.query = Some(RawQuery::Parsed(query));
        self
    }

    /// Sets a structured JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RawBody::Json(body));
        self
    }

    /// Sets a text body.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RawBody::Text(body.into()));
        self
    }

    /// Returns the first value of a header, matched case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.first())
    }
}

impl<B: AsRef<[u8]>> From<http::Request<B>> for RawRequest {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();

        let mut raw = Self::new(
            parts.method.as_str(),
            parts
                .uri
                .path_and_query()
                .map_or_else(|| parts.uri.path().to_string(), ToString::to_string),
        );

        for (name, value) in &parts.headers {
            // Non-visible ASCII header values cannot be validated as strings.
            if let Ok(value) = value.to_str() {
                raw = raw.header(name.as_str(), value);
            }
        }

        let bytes = body.as_ref();
        if !bytes.is_empty() {
            raw.body = Some(RawBody::Text(String::from_utf8_lossy(bytes).into_owned()));
        }
        raw
    }
}

/// A request decomposed according to the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedRequest {
    /// Lowercased HTTP method.
    pub method: String,
    /// Normalised path, query stripped.
    pub path: String,
    /// Path parameters bound from the matched template.
    pub path_params: ParamMap,
    /// Query parameters.
    pub query: ParamMap,
    /// Headers keyed by lowercased name.
    pub headers: ParamMap,
    /// Cookies from the `cookie` header.
    pub cookies: ParamMap,
    /// The body, JSON-decoded when possible.
    pub body: Option<Value>,
    /// The body text as received, when it arrived as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
}

impl ParsedRequest {
    /// Returns a header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        match self.headers.get(&name.to_ascii_lowercase())? {
            Value::String(s) => Some(s),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// Returns the media type of the `content-type` header without parameters.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repeated_header_accumulates() {
        let request = RawRequest::new("GET", "/")
            .header("X-Tag", "a")
            .header("X-Tag", "b");
        assert_eq!(
            request.headers["X-Tag"],
            HeaderValue::Multiple(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(request.header_value("x-tag"), Some("a"));
    }

    #[test]
    fn test_from_http_request() {
        let request = http::Request::builder()
            .method("PUT")
            .uri("/pets/1?verbose=true")
            .header("content-type", "application/json")
            .body(br#"{"name":"Odie"}"#.to_vec())
            .unwrap();

        let raw = RawRequest::from(request);
        assert_eq!(raw.method, "PUT");
        assert_eq!(raw.path, "/pets/1?verbose=true");
        assert_eq!(raw.header_value("Content-Type"), Some("application/json"));
        assert_eq!(raw.body, Some(RawBody::Text(r#"{"name":"Odie"}"#.to_string())));
    }

    #[test]
    fn test_from_http_request_empty_body() {
        let request = http::Request::builder()
            .uri("/pets")
            .body(Vec::<u8>::new())
            .unwrap();
        assert!(RawRequest::from(request).body.is_none());
    }

    #[test]
    fn test_header_value_to_json() {
        assert_eq!(HeaderValue::from("x").to_json(), json!("x"));
        assert_eq!(
            HeaderValue::from(vec!["a".to_string(), "b".to_string()]).to_json(),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_parsed_content_type() {
        let mut parsed = ParsedRequest::default();
        parsed.headers.insert(
            "content-type".to_string(),
            json!("application/json; charset=utf-8"),
        );
        assert_eq!(parsed.content_type(), Some("application/json"));
        assert_eq!(parsed.header("Content-Type"), Some("application/json; charset=utf-8"));
    }
}
