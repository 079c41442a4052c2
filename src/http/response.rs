//! Response normalization module
//!
//! Turns a partial [`ResponseIntent`] into the [`CanonicalResponse`] that crosses
//! the gateway boundary. Every path through [`create`] is total: invalid status
//! codes and unencodable bodies collapse into the canned Internal Server Error.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status used when the intent does not carry one
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Body of the canned failure response: an empty JSON string
pub const EMPTY_JSON_BODY: &str = "\"\"";

const MIN_STATUS_CODE: f64 = 100.0;
const MAX_STATUS_CODE: f64 = 599.0;

/// Header map of a canonical response
pub type Headers = BTreeMap<String, String>;

/// Wire-level response handed to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: Headers,
    pub is_base64_encoded: bool,
}

impl CanonicalResponse {
    /// Get a header value by its exact name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Merge `defaults` beneath the response headers; existing keys win
    #[must_use]
    pub fn with_default_headers(mut self, defaults: &Headers) -> Self {
        for (name, value) in defaults {
            self.headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }
}

/// Header value accepted in an intent; stringified on output
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for HeaderValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<usize> for HeaderValue {
    fn from(value: usize) -> Self {
        Self::Number(value.into())
    }
}

/// Response body before encoding
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Null,
    Text(String),
    Json(Value),
    /// A structured value whose serialization failed when it was attached
    Unencodable(String),
}

impl Body {
    /// Attach any serializable value as a structured body
    ///
    /// Serialization errors are kept in the body and surface as the canned
    /// failure response once the body has to be encoded.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => Self::Json(v),
            Err(e) => Self::Unencodable(e.to_string()),
        }
    }

    /// Encode as a JSON document
    fn encode_json(self) -> Result<String, String> {
        match self {
            Self::Null => Ok("null".to_string()),
            Self::Text(s) => serde_json::to_string(&s).map_err(|e| e.to_string()),
            Self::Json(v) => serde_json::to_string(&v).map_err(|e| e.to_string()),
            Self::Unencodable(reason) => Err(reason),
        }
    }

    /// Pass through without JSON encoding
    fn into_raw(self) -> Result<String, String> {
        match self {
            Self::Null => Ok(String::new()),
            Self::Text(s) | Self::Json(Value::String(s)) => Ok(s),
            Self::Json(v) => Ok(v.to_string()),
            Self::Unencodable(reason) => Err(reason),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Encoding switches of an intent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseOptions {
    /// Encode the body as JSON (default `true`)
    pub json: Option<bool>,
    /// Body is already base64 encoded; overrides `json`
    pub is_base64_encoded: Option<bool>,
}

/// Partial, caller-supplied description of a response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseIntent {
    pub status_code: Option<f64>,
    pub body: Option<Body>,
    pub headers: BTreeMap<String, HeaderValue>,
    pub options: ResponseOptions,
}

impl ResponseIntent {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, status_code: impl Into<f64>) -> Self {
        self.status_code = Some(status_code.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<HeaderValue>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.options.json = Some(json);
        self
    }

    #[must_use]
    pub fn base64(mut self, is_base64_encoded: bool) -> Self {
        self.options.is_base64_encoded = Some(is_base64_encoded);
        self
    }
}

/// Intent merged over the defaults
struct Normalized {
    status_code: f64,
    body: Body,
    headers: Headers,
    json: bool,
    is_base64_encoded: bool,
}

fn normalize(intent: ResponseIntent) -> Normalized {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
    headers.extend(
        intent
            .headers
            .into_iter()
            .map(|(name, value)| (name, value.to_string())),
    );

    Normalized {
        status_code: intent
            .status_code
            .unwrap_or_else(|| f64::from(DEFAULT_STATUS_CODE)),
        body: intent.body.unwrap_or_default(),
        headers,
        json: intent.options.json.unwrap_or(true),
        is_base64_encoded: intent.options.is_base64_encoded.unwrap_or(false),
    }
}

/// Range check first, truncation second: 200.9 passes as 200, 599.5 fails
fn validate_status_code(status_code: f64) -> Option<u16> {
    if !(MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&status_code) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(status_code.trunc() as u16)
}

/// Canned Internal Server Error (500) response
pub fn internal_server_error() -> CanonicalResponse {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());

    CanonicalResponse {
        status_code: 500,
        body: EMPTY_JSON_BODY.to_string(),
        headers,
        is_base64_encoded: false,
    }
}

/// Create a canonical response from an intent
///
/// Never fails: an out-of-range status code or a body that cannot be encoded
/// yields [`internal_server_error`], never a partially built response.
pub fn create(intent: ResponseIntent) -> CanonicalResponse {
    let params = normalize(intent);

    let Some(status_code) = validate_status_code(params.status_code) else {
        tracing::error!(
            status_code = params.status_code,
            "Response status code out of bounds"
        );
        return internal_server_error();
    };

    let mut headers = params.headers;

    let encoded = if params.is_base64_encoded {
        params.body.into_raw()
    } else if params.json {
        headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
        params.body.encode_json()
    } else {
        params.body.into_raw()
    };

    match encoded {
        Ok(body) => CanonicalResponse {
            status_code,
            body,
            headers,
            is_base64_encoded: params.is_base64_encoded,
        },
        Err(reason) => {
            tracing::error!(%reason, "Response body could not be encoded");
            internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};
    use serde_json::json;

    /// Serializes like a structure that refers back to itself
    struct Cyclic;

    impl Serialize for Cyclic {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cyclic structure"))
        }
    }

    #[test]
    fn test_default_response() {
        let res = create(ResponseIntent::new());
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, EMPTY_JSON_BODY);
        assert_eq!(res.header(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
        assert!(!res.is_base64_encoded);
    }

    #[test]
    fn test_out_of_bounds_status_codes() {
        for code in [-200, -40, -1, 0, 1, 2, 10, 23, 99, 600, 700, 750, 93934] {
            let res = create(
                ResponseIntent::new()
                    .status(code)
                    .header("X-Custom", "lost")
                    .body("ignored"),
            );
            assert_eq!(res, internal_server_error(), "status {code}");
        }
    }

    #[test]
    fn test_non_finite_status_code() {
        assert_eq!(
            create(ResponseIntent::new().status(f64::NAN)),
            internal_server_error()
        );
        assert_eq!(
            create(ResponseIntent::new().status(f64::INFINITY)),
            internal_server_error()
        );
    }

    #[test]
    fn test_fractional_status_code() {
        assert_eq!(create(ResponseIntent::new().status(200.9)).status_code, 200);
        assert_eq!(create(ResponseIntent::new().status(599.0)).status_code, 599);
        assert_eq!(create(ResponseIntent::new().status(100.0)).status_code, 100);
        assert_eq!(
            create(ResponseIntent::new().status(599.5)),
            internal_server_error()
        );
        assert_eq!(
            create(ResponseIntent::new().status(99.9)),
            internal_server_error()
        );
    }

    #[test]
    fn test_custom_response() {
        let res = create(ResponseIntent::new().status(411).body("body").header("Test", "Header"));
        assert_eq!(res.status_code, 411);
        assert_eq!(res.body, "\"body\"");
        assert_eq!(res.header("Test"), Some("Header"));
        assert_eq!(res.header(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
        assert_eq!(res.headers.len(), 2);
    }

    #[test]
    fn test_json_body_round_trips() {
        let value = json!({"a": "x", "b": [1, 2, 3], "c": {"d": null, "e": true}});
        let res = create(ResponseIntent::new().body(value.clone()).json(true));
        let parsed: Value = serde_json::from_str(&res.body).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_json_forces_content_type() {
        let res = create(ResponseIntent::new().header(CONTENT_TYPE, "text/plain"));
        assert_eq!(res.header(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn test_null_body_as_json() {
        let res = create(ResponseIntent::new().body(Body::Null));
        assert_eq!(res.body, "null");
    }

    #[test]
    fn test_base64_overrides_json() {
        let encoded = "aGVsbG8gd29ybGQ=";
        let res = create(
            ResponseIntent::new()
                .body(encoded)
                .header(CONTENT_TYPE, "image/jpeg")
                .base64(true)
                .json(true),
        );
        assert_eq!(res.body, encoded);
        assert!(res.is_base64_encoded);
        assert_eq!(res.header(CONTENT_TYPE), Some("image/jpeg"));
    }

    #[test]
    fn test_unencodable_body_yields_canned_error() {
        let res = create(
            ResponseIntent::new()
                .status(201)
                .header("uuid", "abc")
                .body(Body::json(&Cyclic)),
        );
        assert_eq!(res, internal_server_error());
        assert!(!res.headers.contains_key("uuid"));
    }

    #[test]
    fn test_raw_body_passthrough() {
        let res = create(
            ResponseIntent::new()
                .body("<p>hi</p>")
                .header(CONTENT_TYPE, "text/html")
                .json(false),
        );
        assert_eq!(res.body, "<p>hi</p>");
        assert_eq!(res.header(CONTENT_TYPE), Some("text/html"));

        let structured = create(ResponseIntent::new().body(json!({"a": 1})).json(false));
        assert_eq!(structured.body, r#"{"a":1}"#);

        let null = create(ResponseIntent::new().body(Body::Null).json(false));
        assert_eq!(null.body, "");
    }

    #[test]
    fn test_header_values_are_stringified() {
        let res = create(
            ResponseIntent::new()
                .header("X-Count", 42_i64)
                .header("X-Flag", true),
        );
        assert_eq!(res.header("X-Count"), Some("42"));
        assert_eq!(res.header("X-Flag"), Some("true"));
    }

    #[test]
    fn test_with_default_headers() {
        let mut defaults = Headers::new();
        defaults.insert("Default-Header".to_string(), "default value".to_string());
        defaults.insert(CONTENT_TYPE.to_string(), "text/plain".to_string());

        let res = create(ResponseIntent::new()).with_default_headers(&defaults);
        assert_eq!(res.header("Default-Header"), Some("default value"));
        assert_eq!(res.header(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn test_wire_shape() {
        let res = create(ResponseIntent::new().body("hi"));
        let wire = serde_json::to_value(&res).unwrap();
        assert_eq!(
            wire,
            json!({
                "statusCode": 200,
                "body": "\"hi\"",
                "headers": {"Content-Type": "application/json"},
                "isBase64Encoded": false
            })
        );
    }
}
