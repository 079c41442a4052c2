//! Per-configuration response facade
//!
//! A [`Responder`] bundles the error table, default headers, view locals and
//! nonce policy with a view renderer. Every response it returns carries the
//! default headers beneath its own.

use crate::handler::errors::{self, ErrorHandlerTable, ErrorTags, TaggedError};
use crate::handler::nonce::{NoncePolicy, NonceSource, RandomNonce};
use crate::handler::views::{ViewError, ViewLocals, ViewRenderer};
use crate::http::named;
use crate::http::response::{
    internal_server_error, CanonicalResponse, Headers, ResponseIntent, CONTENT_TYPE,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Message of the error raised for responses that cannot be sent
pub const UNKNOWN_RESPONSE: &str = "Unknown response.";

/// Immutable responder settings
#[derive(Debug, Clone, Default)]
pub struct ResponderConfig {
    pub handlers: Option<ErrorHandlerTable>,
    pub default_headers: Headers,
    pub locals: ViewLocals,
    pub nonce: NoncePolicy,
}

#[derive(Clone)]
pub struct Responder {
    config: Arc<ResponderConfig>,
    views: Option<Arc<dyn ViewRenderer>>,
    nonce_source: Arc<dyn NonceSource>,
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("config", &self.config)
            .field("views", &self.views.is_some())
            .finish_non_exhaustive()
    }
}

impl Responder {
    pub fn new(config: ResponderConfig) -> Self {
        Self {
            config: Arc::new(config),
            views: None,
            nonce_source: Arc::new(RandomNonce),
        }
    }

    #[must_use]
    pub fn with_views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = Some(views);
        self
    }

    #[must_use]
    pub fn with_nonce_source(mut self, source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = source;
        self
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    fn finish(&self, response: CanonicalResponse) -> CanonicalResponse {
        response.with_default_headers(&self.config.default_headers)
    }

    /// Map an error through the configured handler table
    pub fn handle(&self, error: Option<&dyn ErrorTags>) -> CanonicalResponse {
        self.finish(errors::handle(self.config.handlers.as_ref(), error))
    }

    /// Pass a prepared response through
    ///
    /// A missing response is the canned 500; a response with a status outside
    /// 100..=599 is handled as an `Unknown response.` error.
    pub fn send(&self, response: Option<CanonicalResponse>) -> CanonicalResponse {
        let Some(response) = response else {
            return self.finish(internal_server_error());
        };

        if (100..=599).contains(&response.status_code) {
            return self.finish(response);
        }

        tracing::error!(
            status_code = response.status_code,
            "Handling unknown error response"
        );
        self.handle(Some(&TaggedError::from_message(UNKNOWN_RESPONSE)))
    }

    /// Render a view into an HTML `ok` response
    ///
    /// `values` are merged over the configured locals. Render failures go
    /// through the error table like any other error.
    pub fn render(&self, view: &str, values: Option<&ViewLocals>) -> CanonicalResponse {
        match self.render_html(view, values) {
            Ok(html) => self.finish(named::ok(
                ResponseIntent::new()
                    .header(CONTENT_TYPE, HTML_CONTENT_TYPE)
                    .json(false)
                    .body(html),
            )),
            Err(e) => {
                tracing::error!(view, error = %e, "View render failed");
                self.handle(Some(&e))
            }
        }
    }

    fn render_html(&self, view: &str, values: Option<&ViewLocals>) -> Result<String, ViewError> {
        let views = self.views.as_ref().ok_or(ViewError::Unavailable)?;

        let mut locals = self.config.locals.clone();
        if let Some(values) = values {
            locals.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        if self.config.nonce.is_enabled() {
            let nonce = self.nonce_source.generate(self.config.nonce.size());
            locals.insert("nonce".to_string(), Value::String(nonce));
        }

        views.render(view, &locals)
    }
}
