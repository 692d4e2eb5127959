// Application state module
// Read-only state shared by every connection task

use super::types::{Config, ServeMode};
use std::time::Duration;

/// Application state, fixed at startup
pub struct AppState {
    pub config: Config,
    pub mode: ServeMode,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, String> {
        let mode = config.serve_mode()?;
        Ok(Self { config, mode })
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.shutdown_timeout)
    }
}
