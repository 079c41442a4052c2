//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request matching and the caching
//! policy applied to static assets.

use crate::http::response::Headers;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

pub const CACHE_CONTROL: &str = "Cache-Control";
pub const ETAG: &str = "ETag";

/// Public cache for one year, the default for static assets
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Length of the digest part of an `ETag`
const ETAG_DIGEST_LEN: usize = 27;

/// Generate a strong `ETag` from content
///
/// Format is `"<byte length in hex>-<base64 sha1 prefix>"`, e.g.
/// `"0-2jmj7l5rSw0yVb/vlWAYkK/YBwk"` for empty content.
pub fn generate_etag(content: &[u8]) -> String {
    let digest = Sha1::digest(content);
    let encoded = STANDARD.encode(digest);
    let hash = &encoded[..ETAG_DIGEST_LEN];
    format!("\"{:x}-{hash}\"", content.len())
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Caching headers applied to every static asset response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachingPolicy {
    pub with_etag: bool,
    pub default_headers: Headers,
}

impl CachingPolicy {
    /// Default policy with `headers` layered over it
    pub fn with_headers<I, K, V>(with_etag: bool, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut policy = Self {
            with_etag,
            ..Self::default()
        };
        policy
            .default_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        policy
    }
}

impl Default for CachingPolicy {
    fn default() -> Self {
        let mut default_headers = Headers::new();
        default_headers.insert(CACHE_CONTROL.to_string(), DEFAULT_CACHE_CONTROL.to_string());
        Self {
            with_etag: true,
            default_headers,
        }
    }
}
