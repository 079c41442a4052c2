// Configuration module entry point
// Loads typed configuration and builds the shared application state from it

mod state;
mod types;

use crate::handler::errors::{ErrorHandlerTable, ErrorKey};
use crate::handler::static_files::ResolveError;
use crate::handler::views::ViewError;
use crate::http::named::{NamedResponse, UnknownResponseName};
use crate::http::response::Headers;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, ConfigErrorKey, HandlerEntry, HeaderEntry, LoggingConfig, ResponsesConfig,
    ServerConfig, StaticsConfig, ViewsConfig,
};

/// Configuration errors surfaced at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("error handler '{key}': {source}")]
    UnknownResponse {
        key: String,
        #[source]
        source: UnknownResponseName,
    },

    #[error(transparent)]
    Views(#[from] ViewError),

    #[error(transparent)]
    Statics(#[from] ResolveError),
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// `GATEWAY_<SECTION>__<KEY>` environment variables override the file,
    /// e.g. `GATEWAY_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("GATEWAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("statics.route_prefix", "/static")?
            .set_default("statics.etag", true)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load `config.toml` (or `config.json`, ...) from the working directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }
}

impl ResponsesConfig {
    /// Error handler table, `None` when no handler is configured
    pub fn handler_table(&self) -> Result<Option<ErrorHandlerTable>, ConfigError> {
        if self.handlers.is_empty() {
            return Ok(None);
        }

        let mut table = ErrorHandlerTable::new();
        for entry in &self.handlers {
            let key = ErrorKey::from(entry.key.clone());
            let named: NamedResponse =
                entry
                    .response
                    .parse()
                    .map_err(|source| ConfigError::UnknownResponse {
                        key: key.to_string(),
                        source,
                    })?;
            table = table.with_named(key, named);
        }
        Ok(Some(table))
    }

    pub fn default_headers(&self) -> Headers {
        to_headers(&self.headers)
    }
}

fn to_headers(entries: &[HeaderEntry]) -> Headers {
    entries
        .iter()
        .map(|h| (h.name.clone(), h.value.clone()))
        .collect()
}
