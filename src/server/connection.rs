// Connection handling module
// Serves one accepted TCP connection on its own task

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a task owned by `connections`.
///
/// The connection holds no shared mutable state, so a failure here (client gone
/// mid-transfer, malformed request) only affects this client. Once `draining` flips,
/// the response in flight is finished and the connection is closed instead of kept alive.
pub fn spawn_connection(
    connections: &mut JoinSet<()>,
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    mut draining: watch::Receiver<bool>,
) {
    connections.spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.http.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state))),
        );
        tokio::pin!(conn);

        let mut closing = false;
        let result = loop {
            tokio::select! {
                res = conn.as_mut() => break res,
                Ok(()) = draining.changed(), if !closing => {
                    closing = true;
                    conn.as_mut().graceful_shutdown();
                }
            }
        };

        if let Err(err) = result {
            if err.is_incomplete_message() {
                logger::log_debug(&format!("Client {peer_addr} closed connection early: {err}"));
            } else {
                logger::log_connection_error(&err);
            }
        }
    });
}
