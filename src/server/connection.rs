// Connection handling module
// Serves HTTP/1.1 on a single accepted TCP connection

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::handler::{self, AppState};
use crate::logger;

/// Spawn a task serving the connection; errors are logged, never fatal to
/// the accept loop.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let service = service_fn(move |req| {
            let state = Arc::clone(&state);
            async move { handler::handle_request(req, state, peer_addr).await }
        });

        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
            logger::log_connection_error(&e);
        }
    });
}
