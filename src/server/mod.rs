// Development server module
// Accept loop, connection handling and request dispatch

pub mod connection;
pub mod dispatch;
pub mod listener;

pub use dispatch::{handle_request, into_http_response, respond};
pub use listener::create_reusable_listener;

use std::sync::Arc;

use crate::config::{AppState, Config};
use crate::logger;

/// Serve until Ctrl+C
pub async fn run(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::from_config(&cfg)?);
    let listener = create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    connection::handle_connection(stream, peer_addr, Arc::clone(&state));
                }
                Err(e) => logger::log_accept_error(&e),
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping accept loop");
                return Ok(());
            }
        }
    }
}
