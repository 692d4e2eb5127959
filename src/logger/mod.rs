//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Startup and shutdown logging
//! - Error, warning and debug logging with a level filter
//! - File-based logging support

pub mod writer;

use crate::config::{Config, ServeMode};
use std::net::SocketAddr;

/// Log severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("Unknown log level: '{other}'")),
        }
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let level = config.logging.level.parse::<Level>()?;
    writer::init(
        level,
        config.logging.log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )?;
    Ok(())
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(Level::Info, writer::LogWriter::level) >= level
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// The one startup line, written before the first connection is accepted
pub fn log_server_start(addr: &SocketAddr, mode: &ServeMode) {
    if enabled(Level::Info) {
        write_info(&format!("[INFO] Server starting on {addr}, serving {mode}"));
    }
}

pub fn log_config(config: &Config) {
    if !enabled(Level::Debug) {
        return;
    }
    if let Some(workers) = config.server.workers {
        write_info(&format!("[DEBUG] Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.log_file {
        write_info(&format!("[DEBUG] Info log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("[DEBUG] Error log: {path}"));
    }
    write_info(&format!(
        "[DEBUG] Index files: {:?}, directory listing: {}",
        config.site.index_files, config.site.directory_listing
    ));
}

pub fn log_server_stop() {
    if enabled(Level::Info) {
        write_info("[INFO] Server stopped");
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_bind_failed(addr: &SocketAddr, err: &std::io::Error) {
    log_error(&format!("Failed to bind {addr}: {err}"));
}

pub fn log_draining(open: usize, timeout: std::time::Duration) {
    log_info(&format!(
        "Waiting up to {}s for {open} open connection(s)",
        timeout.as_secs()
    ));
}
