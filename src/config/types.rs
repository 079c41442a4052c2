// Configuration types module
// Defines all configuration-related data structures

use crate::handler::errors::ErrorKey;
use crate::handler::nonce::NoncePolicy;
use crate::handler::views::ViewLocals;
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub views: ViewsConfig,
    pub statics: StaticsConfig,
    #[serde(default)]
    pub responses: ResponsesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `gateway_response=debug`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stderr if not set)
    #[serde(default)]
    pub log_file: Option<String>,
    /// Emit log events as JSON lines
    #[serde(default)]
    pub json: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// View rendering configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ViewsConfig {
    /// Template directory; rendering is unavailable when unset
    #[serde(default)]
    pub basedir: Option<String>,
    /// Values exposed to every template
    #[serde(default)]
    pub locals: ViewLocals,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticsConfig {
    /// Asset directory; static serving is disabled when unset
    #[serde(default)]
    pub basedir: Option<String>,
    /// Request path prefix routed to the static responder
    pub route_prefix: String,
    pub etag: bool,
    /// Headers sent with every asset, layered over the default Cache-Control
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
}

/// Response facade configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ResponsesConfig {
    #[serde(default)]
    pub nonce: NoncePolicy,
    /// Headers merged beneath every response
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
    /// Error handlers, by error name, message or code
    #[serde(default)]
    pub handlers: Vec<HandlerEntry>,
}

/// Header name and value
///
/// Headers are listed as tables rather than keyed maps so their names keep
/// their case through the `config` crate.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// Error key bound to a named response
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HandlerEntry {
    pub key: ConfigErrorKey,
    /// Named response, e.g. `badRequest`
    pub response: String,
}

/// Integer keys match error codes, strings match names and messages
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ConfigErrorKey {
    Code(i64),
    Text(String),
}

impl From<ConfigErrorKey> for ErrorKey {
    fn from(key: ConfigErrorKey) -> Self {
        match key {
            ConfigErrorKey::Code(code) => Self::Code(code),
            ConfigErrorKey::Text(text) => Self::Text(text),
        }
    }
}
