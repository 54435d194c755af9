//! Server module
//!
//! Listener setup and the accept loop.

mod connection;
mod listener;

pub use connection::accept_connection;
pub use listener::create_listener;

use std::sync::Arc;

use crate::handler::AppState;
use crate::logger;

/// Accept and serve connections until the process is stopped.
pub async fn run(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.socket_addr()?;
    let listener = create_listener(addr)?;

    logger::log_server_start(&addr, &state.config);

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}
