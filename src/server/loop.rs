// Server loop module
// Accepts connections until shutdown is requested, then drains them

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{watch, Notify};
use tokio::task::JoinSet;

use super::connection::spawn_connection;
use crate::config::AppState;
use crate::logger;

/// Pause after an accept error so a full fd table does not spin the loop
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Accept connections and hand each to its own task.
///
/// Returns once `shutdown` is notified and every open connection has finished its
/// response in flight, or `server.shutdown_timeout` has passed; connections still open
/// then are aborted.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    let (drain_tx, drain_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        logger::log_debug(&format!("Accepted connection from {peer_addr}"));
                        spawn_connection(
                            &mut connections,
                            stream,
                            peer_addr,
                            Arc::clone(&state),
                            drain_rx.clone(),
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }
            }

            // Reap finished connections so the set only holds live ones
            Some(_) = connections.join_next(), if !connections.is_empty() => {}

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    drain_tx.send_replace(true);
    drain_connections(&mut connections, state.shutdown_timeout()).await;
    logger::log_server_stop();
}

async fn drain_connections(connections: &mut JoinSet<()>, timeout: Duration) {
    if connections.is_empty() {
        return;
    }
    logger::log_draining(connections.len(), timeout);

    let finished = tokio::time::timeout(timeout, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if finished.is_err() {
        logger::log_warning(&format!(
            "Shutdown timeout reached, aborting {} connection(s)",
            connections.len()
        ));
        connections.shutdown().await;
    }
}
