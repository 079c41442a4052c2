//! HTTP protocol layer module
//!
//! Pure building blocks of the canonical response: normalization and
//! encoding, the named status constructors, caching headers and MIME lookup.
//! Nothing in here performs I/O.

pub mod cache;
pub mod mime;
pub mod named;
pub mod response;

// Re-export commonly used types
pub use cache::CachingPolicy;
pub use named::NamedResponse;
pub use response::{
    create, internal_server_error, Body, CanonicalResponse, HeaderValue, Headers,
    ResponseIntent, ResponseOptions,
};
