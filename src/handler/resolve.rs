//! Request path resolution
//!
//! Maps a URL path onto the document root. Traversal is rejected twice: lexically while
//! normalising the segments, and again after canonicalising so symlinks cannot lead out
//! of the root.

use super::error::ServeError;
use crate::logger;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A resolved filesystem target, always inside the canonical root
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    Directory(PathBuf),
}

/// Turn a URL path into a relative filesystem path
///
/// Percent-escapes are decoded first, then `/` and `\` both split segments. Empty and
/// `.` segments are dropped and `..` pops the previous one; popping past the root is
/// [`ServeError::Forbidden`].
pub fn sanitize_path(url_path: &str) -> Result<PathBuf, ServeError> {
    let decoded = percent_decode_str(url_path)
        .decode_utf8()
        .map_err(|_| ServeError::BadRequest)?;

    if decoded.contains('\0') {
        return Err(ServeError::BadRequest);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ServeError::Forbidden);
                }
            }
            s => segments.push(s),
        }
    }

    Ok(segments.iter().collect())
}

/// Resolve a URL path under `root`
pub async fn resolve_in_root(root: &Path, url_path: &str) -> Result<Resolved, ServeError> {
    let relative = sanitize_path(url_path).inspect_err(|e| {
        if matches!(e, ServeError::Forbidden) {
            logger::log_warning(&format!("Path traversal attempt blocked: {url_path}"));
        }
    })?;

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Document root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return Err(ServeError::NotFound);
        }
    };

    let target = canonicalize_target(&root.join(&relative)).await?;
    ensure_within(&root_canonical, &target, url_path)?;

    let metadata = fs::metadata(&target).await?;
    if metadata.is_dir() {
        Ok(Resolved::Directory(target))
    } else {
        Ok(Resolved::File(target))
    }
}

/// Canonicalize a candidate path
///
/// Anything other than a permission problem means there is nothing to serve, e.g.
/// `ENOTDIR` for `/index.html/child`.
pub async fn canonicalize_target(path: &Path) -> Result<PathBuf, ServeError> {
    fs::canonicalize(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => ServeError::Forbidden,
        _ => ServeError::NotFound,
    })
}

/// Reject canonical targets outside the canonical root
pub fn ensure_within(root_canonical: &Path, target: &Path, url_path: &str) -> Result<(), ServeError> {
    if target.starts_with(root_canonical) {
        Ok(())
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {url_path} -> {}",
            target.display()
        ));
        Err(ServeError::Forbidden)
    }
}
