//! Canonical API gateway responses
//!
//! Normalizes handler output into the `{ statusCode, body, headers,
//! isBase64Encoded }` shape, maps errors to responses through a configurable
//! table, serves static assets with caching headers and renders HTML views.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use handler::{Responder, ResponderConfig};
pub use http::{create, CanonicalResponse, NamedResponse, ResponseIntent};
