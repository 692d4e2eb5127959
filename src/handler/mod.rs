//! Request handler module
//!
//! Maps each request to the fixed file or to a file under the document root.

pub mod error;
pub mod listing;
pub mod resolve;
pub mod router;
pub mod static_files;

pub use error::ServeError;
pub use router::handle_request;
