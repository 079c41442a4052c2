//! Request dispatch module
//!
//! Maps development server requests onto the responder: the static route
//! prefix goes to the asset handler, every other path renders the view of
//! the same name. Canonical responses are then converted into hyper ones.

use crate::config::AppState;
use crate::handler::static_files::CONTENT_LENGTH;
use crate::http::cache::{self, CACHE_CONTROL, ETAG};
use crate::http::named;
use crate::http::response::{
    internal_server_error, CanonicalResponse, ResponseIntent, CONTENT_TYPE,
};
use crate::logger::{self, AccessLogEntry};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// View rendered for `/`
pub const INDEX_VIEW: &str = "index";

const ALLOWED_METHODS: &str = "GET, HEAD";

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let if_none_match = header_string(&req, &IF_NONE_MATCH);

    let canonical = respond(&state, &method, &path, if_none_match.as_deref()).await;
    let response = into_http_response(&canonical, method == Method::HEAD);

    if state.access_log_enabled() {
        let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), method.as_str(), path);
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = http_version(req.version()).to_string();
        entry.status = canonical.status_code;
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_string(&req, &REFERER);
        entry.user_agent = header_string(&req, &USER_AGENT);
        entry.base64 = canonical.is_base64_encoded;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn header_string<B>(req: &Request<B>, name: &HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Produce the canonical response for a request
pub async fn respond(
    state: &AppState,
    method: &Method,
    path: &str,
    if_none_match: Option<&str>,
) -> CanonicalResponse {
    if !matches!(*method, Method::GET | Method::HEAD) {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return state.responder.send(Some(method_not_allowed()));
    }

    if let Some(statics) = &state.statics {
        if let Some(logical_path) = static_path(&state.config.statics.route_prefix, path) {
            return match statics.get(logical_path).await {
                Ok(response) => state
                    .responder
                    .send(Some(revalidate(response, if_none_match))),
                Err(e) => state.responder.handle(Some(&e)),
            };
        }
    }

    state.responder.render(view_name(path), None)
}

fn method_not_allowed() -> CanonicalResponse {
    named::create_with_status(
        405,
        ResponseIntent::new()
            .header("Allow", ALLOWED_METHODS)
            .header(CONTENT_TYPE, "text/plain")
            .json(false),
    )
}

/// Strip the static route prefix, `None` when the path is outside it
fn static_path<'a>(route_prefix: &str, path: &'a str) -> Option<&'a str> {
    let prefix = route_prefix.trim_end_matches('/');
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest.trim_start_matches('/'))
    } else {
        None
    }
}

/// Replace an asset response with Not Modified when the client copy is current
fn revalidate(response: CanonicalResponse, if_none_match: Option<&str>) -> CanonicalResponse {
    let Some(etag) = response.header(ETAG) else {
        return response;
    };
    if !cache::check_etag_match(if_none_match, etag) {
        return response;
    }

    let mut intent = ResponseIntent::new().header(ETAG, etag).json(false);
    for name in [CACHE_CONTROL, CONTENT_TYPE] {
        if let Some(value) = response.header(name) {
            intent = intent.header(name, value);
        }
    }
    named::not_modified(intent)
}

fn view_name(path: &str) -> &str {
    match path.trim_matches('/') {
        "" => INDEX_VIEW,
        name => name,
    }
}

/// Convert a canonical response into a hyper response
///
/// Base64 bodies are decoded. `Content-Length` is recomputed from the bytes
/// actually sent.
pub fn into_http_response(canonical: &CanonicalResponse, is_head: bool) -> Response<Full<Bytes>> {
    let body = if canonical.is_base64_encoded {
        match STANDARD.decode(&canonical.body) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                tracing::error!(error = %e, "Invalid base64 response body");
                return into_http_response(&internal_server_error(), is_head);
            }
        }
    } else {
        Bytes::from(canonical.body.clone())
    };

    let mut builder = Response::builder().status(canonical.status_code);
    for (name, value) in &canonical.headers {
        if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }

    let body = if is_head { Bytes::new() } else { body };
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        logger::log_build_error(&e);
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}
