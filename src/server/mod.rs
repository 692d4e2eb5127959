// Server module entry point
// Binds the listener, writes the startup line and runs the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// loop is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::{AppState, ServeMode};
use crate::logger;

pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// Bind, announce and serve until SIGINT/SIGTERM, then drain open connections
///
/// A bind failure is logged and returned; the caller exits non-zero.
pub async fn run(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.get_socket_addr()?;

    let listener = create_listener(addr).inspect_err(|e| logger::log_bind_failed(&addr, e))?;

    warn_if_missing(&state.mode);
    logger::log_server_start(&listener.local_addr()?, &state.mode);
    logger::log_config(&state.config);

    let shutdown = Arc::new(Notify::new());
    signal::start_signal_handler(Arc::clone(&shutdown));

    start_server_loop(listener, state, shutdown).await;
    Ok(())
}

/// The resource may appear later, so a missing one is only worth a warning
fn warn_if_missing(mode: &ServeMode) {
    match mode {
        ServeMode::FixedFile(path) if !path.is_file() => {
            logger::log_warning(&format!(
                "File '{}' does not exist yet; requests will get 404",
                path.display()
            ));
        }
        ServeMode::Directory { root } if !root.is_dir() => {
            logger::log_warning(&format!(
                "Document root '{}' is not a directory; requests will get 404",
                root.display()
            ));
        }
        _ => {}
    }
}
