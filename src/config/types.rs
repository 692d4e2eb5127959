// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
    /// Seconds open connections get to finish after a shutdown signal
    pub shutdown_timeout: u64,
}

/// What gets served: a document root or a single fixed file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Document root for directory mode
    #[serde(default)]
    pub root_dir: Option<String>,
    /// Fixed file for fixed-file mode, takes every request path
    #[serde(default)]
    pub file_path: Option<String>,
    pub index_files: Vec<String>,
    pub directory_listing: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Info log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub keep_alive: bool,
}

/// Serve mode resolved from `SiteConfig` at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeMode {
    /// Every request path maps to this one file
    FixedFile(PathBuf),
    /// Request paths are resolved under `root`
    Directory { root: PathBuf },
}

impl std::fmt::Display for ServeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedFile(path) => write!(f, "fixed file {}", path.display()),
            Self::Directory { root } => write!(f, "directory {}", root.display()),
        }
    }
}

/// Command-line and environment overrides, applied on top of the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub root_dir: Option<String>,
    pub file_path: Option<String>,
}
