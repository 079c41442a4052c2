//! Static file serving module
//!
//! Builds asset responses from the bytes and metadata supplied by an
//! [`AssetResolver`]. Bodies are never JSON encoded here, whatever their
//! content type; they travel as raw text or base64.

use crate::handler::errors::ErrorTags;
use crate::http::cache::{self, CachingPolicy, ETAG};
use crate::http::mime::OCTET_STREAM;
use crate::http::named;
use crate::http::response::{CanonicalResponse, Headers, ResponseIntent, CONTENT_TYPE};
use async_trait::async_trait;

pub const CONTENT_LENGTH: &str = "Content-Length";

/// Status a resolver reports for a missing asset
pub const NOT_FOUND_SENTINEL: u16 = 404;

/// File contents and metadata produced by a resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFileMetadata {
    pub body: String,
    pub headers: Headers,
    pub is_base64_encoded: bool,
    pub status_code: u16,
}

impl StaticFileMetadata {
    pub fn found(body: String, content_type: &str, is_base64_encoded: bool) -> Self {
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE.to_string(), content_type.to_string());
        Self {
            body,
            headers,
            is_base64_encoded,
            status_code: 200,
        }
    }

    pub fn not_found() -> Self {
        Self {
            body: String::new(),
            headers: Headers::new(),
            is_base64_encoded: false,
            status_code: NOT_FOUND_SENTINEL,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        self.status_code == NOT_FOUND_SENTINEL
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).map(String::as_str)
    }
}

/// Resolution failures other than "not found"
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("static base directory '{path}' is unavailable: {source}")]
    BaseDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ErrorTags for ResolveError {
    fn name(&self) -> Option<&str> {
        Some("StaticResolveError")
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Resolves a logical path to file contents
#[async_trait]
pub trait AssetResolver: Send + Sync {
    /// Return [`StaticFileMetadata::not_found`] for missing assets; errors
    /// are reserved for failures the caller must deal with
    async fn resolve(&self, logical_path: &str) -> Result<StaticFileMetadata, ResolveError>;
}

/// Canned Not Found response for missing assets
pub fn file_not_found() -> CanonicalResponse {
    named::not_found(
        ResponseIntent::new()
            .header(CONTENT_TYPE, "text/plain")
            .json(false),
    )
}

fn response_intent(policy: &CachingPolicy, file: StaticFileMetadata) -> ResponseIntent {
    let content_type = file.content_type().unwrap_or(OCTET_STREAM).to_string();

    let mut intent = ResponseIntent::new()
        .headers(policy.default_headers.clone())
        .header(CONTENT_LENGTH, file.body.len())
        .header(CONTENT_TYPE, content_type)
        .base64(file.is_base64_encoded)
        .json(false);

    if policy.with_etag {
        intent = intent.header(ETAG, cache::generate_etag(file.body.as_bytes()));
    }

    intent.body(file.body)
}

/// Resolve an asset and build its response
///
/// Resolver errors propagate unchanged; only the not-found sentinel is
/// interpreted here.
pub async fn get<R>(
    resolver: &R,
    policy: &CachingPolicy,
    logical_path: &str,
) -> Result<CanonicalResponse, ResolveError>
where
    R: AssetResolver + ?Sized,
{
    let file = resolver.resolve(logical_path).await?;

    if file.is_not_found() {
        tracing::debug!(logical_path, "Static asset not found");
        return Ok(file_not_found());
    }

    Ok(named::ok(response_intent(policy, file)))
}

/// Resolver bound to its caching policy
#[derive(Debug, Clone)]
pub struct StaticFileHandler<R> {
    resolver: R,
    policy: CachingPolicy,
}

impl<R: AssetResolver> StaticFileHandler<R> {
    pub const fn new(resolver: R, policy: CachingPolicy) -> Self {
        Self { resolver, policy }
    }

    pub const fn policy(&self) -> &CachingPolicy {
        &self.policy
    }

    pub async fn get(&self, logical_path: &str) -> Result<CanonicalResponse, ResolveError> {
        get(&self.resolver, &self.policy, logical_path).await
    }
}
