//! Minimal static file server.
//!
//! Serves either one fixed file for every request path, or the files under a document
//! root, over plaintext HTTP/1.1.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
