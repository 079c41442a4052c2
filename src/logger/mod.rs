//! Logger module
//!
//! Installs the global `tracing` subscriber and provides the server
//! lifecycle and access logging helpers:
//! - Level filtering through `EnvFilter` directives
//! - Text or JSON event formatting
//! - Optional file output (stderr otherwise)
//! - Access logging in combined, common or json format

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::fs::OpenOptions;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Initialize the logger with configuration
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over the configured level.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = match &config.log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        None => BoxMakeWriter::new(io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(config.log_file.is_none());
    let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        layer.json().boxed()
    } else {
        layer.boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(io::Error::other)
}

/// Open log file in append mode, creating parent directories if needed
fn open_log_file(path: &str) -> io::Result<std::fs::File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        level = %config.logging.level,
        workers = ?config.server.workers,
        views = ?config.views.basedir,
        statics = ?config.statics.basedir,
        route_prefix = %config.statics.route_prefix,
        "Gateway response server listening on http://{addr}"
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!(error = ?err, "Failed to serve connection");
}

pub fn log_accept_error(err: &io::Error) {
    tracing::error!(error = %err, "Failed to accept connection");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_build_error(err: &impl std::fmt::Display) {
    tracing::error!(error = %err, "Failed to build HTTP response");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
