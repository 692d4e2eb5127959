// Configuration module entry point
// Loads layered configuration and builds the read-only application state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, Overrides, ServeMode, ServerConfig, SiteConfig,
};

/// Directory served when neither a root nor a fixed file is configured
pub const DEFAULT_ROOT_DIR: &str = "static";

impl Config {
    /// Load configuration from the given file, then apply overrides
    ///
    /// Precedence (lowest first): defaults, config file, `STATIC__*` env vars, overrides.
    /// A missing config file is not an error.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("server.shutdown_timeout", 10)?
            .set_default("site.index_files", vec!["index.html"])?
            .set_default("site.directory_listing", true)?
            .set_default("logging.level", "info")?
            .set_default("http.server_name", "static_server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.keep_alive", true)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STATIC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("site.root_dir", overrides.root_dir.clone())?
            .set_override_option("site.file_path", overrides.file_path.clone())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        // IPv6 literals need brackets to parse as a socket address
        let host = &self.server.host;
        let addr = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.server.port)
        } else {
            format!("{host}:{}", self.server.port)
        };
        addr.parse().map_err(|e| format!("Invalid address '{addr}': {e}"))
    }

    /// Decide between fixed-file and directory mode
    pub fn serve_mode(&self) -> Result<ServeMode, String> {
        match (&self.site.file_path, &self.site.root_dir) {
            (Some(file), Some(root)) => Err(format!(
                "Both site.file_path ('{file}') and site.root_dir ('{root}') are set; choose one"
            )),
            (Some(file), None) => Ok(ServeMode::FixedFile(PathBuf::from(file))),
            (None, Some(root)) => Ok(ServeMode::Directory {
                root: PathBuf::from(root),
            }),
            (None, None) => Ok(ServeMode::Directory {
                root: PathBuf::from(DEFAULT_ROOT_DIR),
            }),
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
