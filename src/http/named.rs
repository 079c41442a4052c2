//! Named response module
//!
//! Pre-bound constructors fixing one HTTP status code each. The fixed code
//! always overrides whatever status the caller put in the intent.

use crate::http::response::{create, CanonicalResponse, ResponseIntent};
use std::fmt;
use std::str::FromStr;

/// The named responses, in status code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedResponse {
    Ok,
    Created,
    NoContent,
    MovedPermanently,
    NotModified,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAcceptable,
    Conflict,
    PreconditionFailed,
    InternalServerError,
}

impl NamedResponse {
    pub const ALL: [Self; 13] = [
        Self::Ok,
        Self::Created,
        Self::NoContent,
        Self::MovedPermanently,
        Self::NotModified,
        Self::BadRequest,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::NotAcceptable,
        Self::Conflict,
        Self::PreconditionFailed,
        Self::InternalServerError,
    ];

    pub const fn status_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::MovedPermanently => 301,
            Self::NotModified => 304,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::NotAcceptable => 406,
            Self::Conflict => 409,
            Self::PreconditionFailed => 412,
            Self::InternalServerError => 500,
        }
    }

    /// Name used in configuration files
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Created => "created",
            Self::NoContent => "noContent",
            Self::MovedPermanently => "movedPermanently",
            Self::NotModified => "notModified",
            Self::BadRequest => "badRequest",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "notFound",
            Self::NotAcceptable => "notAcceptable",
            Self::Conflict => "conflict",
            Self::PreconditionFailed => "preconditionFailed",
            Self::InternalServerError => "internalServerError",
        }
    }

    pub fn respond(self, intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
        create_with_status(self.status_code(), intent)
    }
}

impl fmt::Display for NamedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown named response '{0}'")]
pub struct UnknownResponseName(pub String);

impl FromStr for NamedResponse {
    type Err = UnknownResponseName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|named| named.name() == s)
            .ok_or_else(|| UnknownResponseName(s.to_string()))
    }
}

/// Create a response with an arbitrary status code
pub fn create_with_status(
    status_code: u16,
    intent: impl Into<Option<ResponseIntent>>,
) -> CanonicalResponse {
    let intent = intent.into().unwrap_or_default();
    create(intent.status(status_code))
}

/// Ok (200)
pub fn ok(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::Ok.respond(intent)
}

/// Created (201)
pub fn created(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::Created.respond(intent)
}

/// No Content (204)
pub fn no_content(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::NoContent.respond(intent)
}

/// Moved Permanently (301)
pub fn moved_permanently(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::MovedPermanently.respond(intent)
}

/// Not Modified (304)
pub fn not_modified(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::NotModified.respond(intent)
}

/// Bad Request (400)
pub fn bad_request(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::BadRequest.respond(intent)
}

/// Unauthorized (401)
pub fn unauthorized(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::Unauthorized.respond(intent)
}

/// Forbidden (403)
pub fn forbidden(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::Forbidden.respond(intent)
}

/// Not Found (404)
pub fn not_found(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::NotFound.respond(intent)
}

/// Not Acceptable (406)
pub fn not_acceptable(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::NotAcceptable.respond(intent)
}

/// Conflict (409)
pub fn conflict(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::Conflict.respond(intent)
}

/// Precondition Failed (412)
pub fn precondition_failed(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::PreconditionFailed.respond(intent)
}

/// Internal Server Error (500)
pub fn internal_server_error(intent: impl Into<Option<ResponseIntent>>) -> CanonicalResponse {
    NamedResponse::InternalServerError.respond(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{Body, CONTENT_TYPE, JSON_CONTENT_TYPE};
    use serde_json::json;

    #[test]
    fn test_ok_scenario() {
        let res = ok(ResponseIntent::new().body("hi"));
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, "\"hi\"");
        assert_eq!(res.header(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
        assert_eq!(res.headers.len(), 1);
        assert!(!res.is_base64_encoded);
    }

    #[test]
    fn test_named_codes_override_intent_status() {
        let expected = [200, 201, 204, 301, 304, 400, 401, 403, 404, 406, 409, 412, 500];
        for (named, code) in NamedResponse::ALL.into_iter().zip(expected) {
            let res = named.respond(ResponseIntent::new().status(418).body("words"));
            assert_eq!(res.status_code, code, "{named}");
            assert_eq!(res.body, "\"words\"");
        }
    }

    #[test]
    fn test_named_response_keeps_headers() {
        for named in NamedResponse::ALL {
            let res = named.respond(
                ResponseIntent::new()
                    .header("uuid", "1234")
                    .body(json!({"a": "x", "b": "y"}))
                    .json(true),
            );
            assert_eq!(res.header("uuid"), Some("1234"));
            assert_eq!(res.header(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
            assert_eq!(res.body, r#"{"a":"x","b":"y"}"#);
        }
    }

    #[test]
    fn test_named_response_without_intent() {
        let res = not_found(None);
        assert_eq!(res.status_code, 404);
        assert_eq!(res.body, "\"\"");
    }

    #[test]
    fn test_named_response_unencodable_body() {
        let mut body = std::collections::HashMap::new();
        body.insert((1, 2), "tuple keys are not valid JSON object keys");

        let res = conflict(ResponseIntent::new().body(Body::json(&body)));
        assert_eq!(res.status_code, 500);
        assert_eq!(res.body, "\"\"");
    }

    #[test]
    fn test_free_functions_match_table() {
        assert_eq!(created(None).status_code, 201);
        assert_eq!(no_content(None).status_code, 204);
        assert_eq!(moved_permanently(None).status_code, 301);
        assert_eq!(not_modified(None).status_code, 304);
        assert_eq!(bad_request(None).status_code, 400);
        assert_eq!(unauthorized(None).status_code, 401);
        assert_eq!(forbidden(None).status_code, 403);
        assert_eq!(not_acceptable(None).status_code, 406);
        assert_eq!(precondition_failed(None).status_code, 412);
        assert_eq!(internal_server_error(None).status_code, 500);
    }

    #[test]
    fn test_parse_names() {
        for named in NamedResponse::ALL {
            assert_eq!(named.name().parse::<NamedResponse>(), Ok(named));
        }
        assert!("teapot".parse::<NamedResponse>().is_err());
    }

    #[test]
    fn test_create_with_status() {
        assert_eq!(create_with_status(411, None).status_code, 411);
        assert_eq!(create_with_status(700, None).status_code, 500);
    }
}
