//! Static file serving module
//!
//! Opens files for both serve modes and streams them into responses.

use super::error::ServeError;
use super::listing;
use super::resolve::{self, Resolved};
use super::router::RequestContext;
use crate::http::{self, mime, response, RangeParseResult, ResponseBody};
use hyper::{Response, StatusCode};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncSeekExt;

/// Fixed-file mode: every request gets the same file
pub async fn serve_fixed_file(ctx: &RequestContext<'_>, file_path: &Path) -> Response<ResponseBody> {
    serve_file(ctx, file_path).await
}

/// Directory mode: resolve the request path under `root`
pub async fn serve_from_root(
    ctx: &RequestContext<'_>,
    root: &Path,
    index_files: &[String],
    directory_listing: bool,
) -> Response<ResponseBody> {
    let resolved = match resolve::resolve_in_root(root, ctx.path).await {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    match resolved {
        Resolved::File(path) => serve_file(ctx, &path).await,
        Resolved::Directory(dir) => {
            serve_directory(ctx, root, &dir, index_files, directory_listing).await
        }
    }
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    root: &Path,
    dir: &Path,
    index_files: &[String],
    directory_listing: bool,
) -> Response<ResponseBody> {
    // Relative links inside an index page only work below a trailing slash
    if !ctx.path.ends_with('/') {
        return http::build_redirect_response(
            &trailing_slash_target(ctx.path, ctx.query),
            StatusCode::MOVED_PERMANENTLY,
        );
    }

    match find_index(root, dir, index_files, ctx.path).await {
        Ok(Some(index)) => return serve_file(ctx, &index).await,
        Ok(None) => {}
        Err(e) => return e.into_response(),
    }

    if !directory_listing {
        return ServeError::Forbidden.into_response();
    }

    match listing::read_entries(dir).await {
        Ok(entries) => {
            http::build_html_response(listing::render_listing(ctx.path, &entries), ctx.is_head)
        }
        Err(e) => error_response(dir, ServeError::from(e)),
    }
}

/// Location for a directory requested without its trailing slash
///
/// Relative to the request path, so a path starting with `//` can never turn into a
/// redirect to another host.
fn trailing_slash_target(path: &str, query: Option<&str>) -> String {
    let last = path.rsplit('/').next().unwrap_or_default();
    match query {
        Some(q) => format!("./{last}/?{q}"),
        None => format!("./{last}/"),
    }
}

/// First configured index file inside `dir`, still confined to the root
async fn find_index(
    root: &Path,
    dir: &Path,
    index_files: &[String],
    url_path: &str,
) -> Result<Option<PathBuf>, ServeError> {
    let root_canonical = resolve::canonicalize_target(root).await?;

    for name in index_files {
        let candidate = dir.join(name);
        let Ok(canonical) = resolve::canonicalize_target(&candidate).await else {
            continue;
        };
        if fs::metadata(&canonical).await.is_ok_and(|m| m.is_file()) {
            resolve::ensure_within(&root_canonical, &canonical, url_path)?;
            return Ok(Some(canonical));
        }
    }

    Ok(None)
}

/// Open a regular file for streaming and report its length
///
/// A directory where a file is expected counts as missing.
pub async fn open_file(path: &Path) -> Result<(File, u64), ServeError> {
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    if metadata.is_dir() {
        return Err(ServeError::NotFound);
    }
    Ok((file, metadata.len()))
}

/// 200, 206 or 416 depending on the Range header
async fn serve_file(ctx: &RequestContext<'_>, path: &Path) -> Response<ResponseBody> {
    let (mut file, len) = match open_file(path).await {
        Ok(opened) => opened,
        Err(e) => return error_response(path, e),
    };
    let content_type = mime::content_type_for(path);

    match http::parse_range_header(ctx.range_header, len) {
        RangeParseResult::Partial(range) => {
            if let Err(e) = file.seek(SeekFrom::Start(range.start)).await {
                return error_response(path, ServeError::from(e));
            }
            response::build_partial_response(file, content_type, range, len, ctx.is_head)
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(len),
        RangeParseResult::Full => response::build_file_response(file, len, content_type, ctx.is_head),
    }
}

fn error_response(path: &Path, err: ServeError) -> Response<ResponseBody> {
    if let ServeError::Io(ref e) = err {
        crate::logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
    }
    err.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_target() {
        assert_eq!(trailing_slash_target("/docs", None), "./docs/");
        assert_eq!(trailing_slash_target("/a/b", Some("x=1")), "./b/?x=1");
        assert_eq!(trailing_slash_target("//evil.example", None), "./evil.example/");
    }

    #[tokio::test]
    async fn test_open_file_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            open_file(dir.path()).await,
            Err(ServeError::NotFound)
        ));

        std::fs::write(dir.path().join("a.txt"), "abc").unwrap();
        let (_, len) = open_file(&dir.path().join("a.txt")).await.unwrap();
        assert_eq!(len, 3);
    }
}
