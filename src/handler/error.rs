//! Per-request failure taxonomy
//!
//! Every failure while resolving or reading a resource ends up as one of these and is
//! answered to that client only.

use crate::http::{self, ResponseBody};
use hyper::Response;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ServeError {
    /// Request path could not be decoded
    BadRequest,
    NotFound,
    /// Traversal outside the root, permission denied, or listing disabled
    Forbidden,
    /// Any other I/O failure while reading the resource
    Io(io::Error),
}

impl ServeError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::Io(_) => 500,
        }
    }

    pub fn into_response(self) -> Response<ResponseBody> {
        match self {
            Self::BadRequest => http::build_400_response(),
            Self::NotFound => http::build_404_response(),
            Self::Forbidden => http::build_403_response(),
            Self::Io(_) => http::build_500_response(),
        }
    }
}

impl From<io::Error> for ServeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Io(err),
        }
    }
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => f.write_str("bad request path"),
            Self::NotFound => f.write_str("not found"),
            Self::Forbidden => f.write_str("forbidden"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}
