//! Error response module
//!
//! Maps a raised error to a response through a table keyed by error name,
//! message or code. Lookups run name, then message, then code, and every hit
//! replaces the previous one: a code handler beats a message handler, which
//! beats a name handler, which beats the generic 500.

use crate::http::named::NamedResponse;
use crate::http::response::{internal_server_error, CanonicalResponse};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Key of an error handler
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKey {
    /// Matched against error names and messages, and against text codes
    Text(String),
    /// Matched against numeric error codes only
    Code(i64),
}

impl ErrorKey {
    /// Keys that are falsy never match
    fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Code(c) => *c == 0,
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Code(c) => write!(f, "{c}"),
        }
    }
}

impl From<&str> for ErrorKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ErrorKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ErrorKey {
    fn from(value: i64) -> Self {
        Self::Code(value)
    }
}

impl From<i32> for ErrorKey {
    fn from(value: i32) -> Self {
        Self::Code(value.into())
    }
}

/// Optional identifying tags of an error
pub trait ErrorTags: fmt::Debug {
    fn name(&self) -> Option<&str> {
        None
    }

    fn message(&self) -> Option<String> {
        None
    }

    fn code(&self) -> Option<ErrorKey> {
        None
    }
}

/// General purpose error carrying explicit tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedError {
    pub name: Option<String>,
    pub message: Option<String>,
    pub code: Option<ErrorKey>,
}

impl TaggedError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new().with_message(message)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<ErrorKey>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for TaggedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.message) {
            (Some(name), Some(message)) => write!(f, "{name}: {message}"),
            (Some(name), None) => f.write_str(name),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("error"),
        }
    }
}

impl std::error::Error for TaggedError {}

impl ErrorTags for TaggedError {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn message(&self) -> Option<String> {
        self.message.clone()
    }

    fn code(&self) -> Option<ErrorKey> {
        self.code.clone()
    }
}

/// Zero-argument response producer
pub type ErrorHandler = Arc<dyn Fn() -> CanonicalResponse + Send + Sync>;

/// Error handlers keyed by error name, message or code
#[derive(Clone, Default)]
pub struct ErrorHandlerTable {
    handlers: HashMap<ErrorKey, ErrorHandler>,
}

impl ErrorHandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one under the same key
    #[must_use]
    pub fn with<F>(mut self, key: impl Into<ErrorKey>, handler: F) -> Self
    where
        F: Fn() -> CanonicalResponse + Send + Sync + 'static,
    {
        self.insert(key, handler);
        self
    }

    /// Register a named response with no intent as the handler
    #[must_use]
    pub fn with_named(self, key: impl Into<ErrorKey>, named: NamedResponse) -> Self {
        self.with(key, move || named.respond(None))
    }

    pub fn insert<F>(&mut self, key: impl Into<ErrorKey>, handler: F)
    where
        F: Fn() -> CanonicalResponse + Send + Sync + 'static,
    {
        self.handlers.insert(key.into(), Arc::new(handler));
    }

    pub fn contains(&self, key: &ErrorKey) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn lookup(&self, key: Option<ErrorKey>) -> Option<CanonicalResponse> {
        let key = key.filter(|k| !k.is_empty())?;
        self.handlers.get(&key).map(|handler| handler())
    }
}

impl fmt::Debug for ErrorHandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// Map an error to a response
///
/// Never fails. Nothing about the error reaches the response; it is only
/// logged. Without a table or an error the generic 500 is returned.
pub fn handle(table: Option<&ErrorHandlerTable>, error: Option<&dyn ErrorTags>) -> CanonicalResponse {
    let mut response = internal_server_error();

    if let (Some(table), Some(error)) = (table, error) {
        if let Some(handled) = table.lookup(error.name().map(ErrorKey::from)) {
            response = handled;
        }

        if let Some(handled) = table.lookup(error.message().map(ErrorKey::Text)) {
            response = handled;
        }

        if let Some(handled) = table.lookup(error.code()) {
            response = handled;
        }
    }

    tracing::error!(
        error = ?error,
        status_code = response.status_code,
        "Handled error response"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::named;
    use crate::http::response::ResponseIntent;

    fn table() -> ErrorHandlerTable {
        ErrorHandlerTable::new()
            .with_named(11000, NamedResponse::Conflict)
            .with_named("ValidationError", NamedResponse::BadRequest)
            .with_named("You must do that first!", NamedResponse::PreconditionFailed)
    }

    #[test]
    fn test_no_table_no_error() {
        assert_eq!(handle(None, None), internal_server_error());
    }

    #[test]
    fn test_no_table_with_code() {
        let error = TaggedError::new().with_code(11000);
        assert_eq!(handle(None, Some(&error)), internal_server_error());
    }

    #[test]
    fn test_table_without_error() {
        assert_eq!(handle(Some(&table()), None), internal_server_error());
    }

    #[test]
    fn test_known_code() {
        let error = TaggedError::new().with_code(11000);
        let res = handle(Some(&table()), Some(&error));
        assert_eq!(res.status_code, 409);
        assert_eq!(res.body, "\"\"");
    }

    #[test]
    fn test_known_name() {
        let error = TaggedError::new().with_name("ValidationError");
        assert_eq!(handle(Some(&table()), Some(&error)).status_code, 400);
    }

    #[test]
    fn test_known_message() {
        let error = TaggedError::from_message("You must do that first!");
        assert_eq!(handle(Some(&table()), Some(&error)).status_code, 412);
    }

    #[test]
    fn test_unknown_error() {
        let error = TaggedError::from_message("boom").with_name("Error");
        assert_eq!(handle(Some(&table()), Some(&error)), internal_server_error());
    }

    #[test]
    fn test_later_matches_win() {
        let table = table();

        // name and message: message wins
        let error = TaggedError::from_message("You must do that first!").with_name("ValidationError");
        assert_eq!(handle(Some(&table), Some(&error)).status_code, 412);

        // name, message and code: code wins
        let error = error.with_code(11000);
        assert_eq!(handle(Some(&table), Some(&error)).status_code, 409);

        // name and code: code wins
        let error = TaggedError::new().with_name("ValidationError").with_code(11000);
        assert_eq!(handle(Some(&table), Some(&error)).status_code, 409);
    }

    #[test]
    fn test_text_and_numeric_codes_are_distinct() {
        let table = ErrorHandlerTable::new().with_named("11000", NamedResponse::Forbidden);
        let numeric = TaggedError::new().with_code(11000);
        assert_eq!(handle(Some(&table), Some(&numeric)).status_code, 500);

        let text = TaggedError::new().with_code("11000");
        assert_eq!(handle(Some(&table), Some(&text)).status_code, 403);
    }

    #[test]
    fn test_error_details_never_leak() {
        let table = ErrorHandlerTable::new().with("secret", || {
            named::unauthorized(ResponseIntent::new().body("denied"))
        });
        let error = TaggedError::from_message("secret").with_name("Leaky");
        let res = handle(Some(&table), Some(&error));
        assert_eq!(res.status_code, 401);
        assert_eq!(res.body, "\"denied\"");
        assert!(!res.body.contains("Leaky"));
    }

    #[test]
    fn test_empty_tags_never_match() {
        let table = ErrorHandlerTable::new()
            .with_named("", NamedResponse::Forbidden)
            .with_named(0, NamedResponse::Conflict);
        let error = TaggedError::from_message("").with_name("").with_code(0);
        assert_eq!(handle(Some(&table), Some(&error)), internal_server_error());
    }
}
