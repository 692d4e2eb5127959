//! HTTP response building module
//!
//! Builders for each status the server answers with, decoupled from path resolution.

use futures::stream;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::{Response, StatusCode};
use std::io;
use std::ops::Range;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, Take};

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Read size for streamed file bodies
const CHUNK_SIZE: usize = 64 * 1024;

/// Body of every response: a buffered page or a file streamed from disk
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Stream the next `len` bytes of `file`, starting at its current position
pub fn file_body(file: File, len: u64) -> ResponseBody {
    StreamBody::new(stream::try_unfold(file.take(len), read_chunk)).boxed_unsync()
}

async fn read_chunk(mut reader: Take<File>) -> io::Result<Option<(Frame<Bytes>, Take<File>)>> {
    let mut buf = vec![0; CHUNK_SIZE];
    let n = reader.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some((Frame::data(Bytes::from(buf)), reader)))
}

/// Build a plain-text error page for any status
pub fn build_error_response(status: StatusCode) -> Response<ResponseBody> {
    let message = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );

    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", message.len())
        .body(full(message))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<ResponseBody> {
    build_error_response(StatusCode::BAD_REQUEST)
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<ResponseBody> {
    build_error_response(StatusCode::FORBIDDEN)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_error_response(StatusCode::NOT_FOUND)
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response = build_error_response(StatusCode::METHOD_NOT_ALLOWED);
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, Range")
            .header("Access-Control-Max-Age", "86400");
    }

    builder
        .body(empty())
        .unwrap_or_else(|e| fallback(StatusCode::NO_CONTENT, &e))
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    let mut response = build_error_response(StatusCode::RANGE_NOT_SATISFIABLE);
    if let Ok(value) = format!("bytes */{file_size}").parse() {
        response.headers_mut().insert("Content-Range", value);
    }
    response
}

/// Build redirect response, e.g. 301 for a directory requested without trailing slash
pub fn build_redirect_response(target: &str, status: StatusCode) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header("Location", target)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(full("Redirecting..."))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Build generated HTML response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Build 200 response streaming a whole file of `len` bytes
pub fn build_file_response(
    file: File,
    len: u64,
    content_type: &str,
    is_head: bool,
) -> Response<ResponseBody> {
    let body = if is_head { empty() } else { file_body(file, len) };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", len)
        .header("Accept-Ranges", "bytes")
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Build 206 Partial Content response
///
/// `file` must already be positioned at `range.start`.
pub fn build_partial_response(
    file: File,
    content_type: &str,
    range: Range<u64>,
    total_size: u64,
    is_head: bool,
) -> Response<ResponseBody> {
    let content_length = range.end - range.start;
    let content_range = format!("bytes {}-{}/{total_size}", range.start, range.end - 1);
    let body = if is_head {
        empty()
    } else {
        file_body(file, content_length)
    };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Content-Range", content_range)
        .header("Accept-Ranges", "bytes")
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::PARTIAL_CONTENT, &e))
}

/// Log the build failure and answer with a bare response
fn fallback(status: StatusCode, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(empty());
    *response.status_mut() = status;
    response
}
