//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, serve-mode dispatch
//! and common response headers.

use crate::config::{AppState, ServeMode};
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger;
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub range_header: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// Never fails: every error becomes a response for this client only.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    // Request bodies are never read
    let (parts, _) = req.into_parts();

    let mut response = match check_http_method(&parts.method, state.config.http.enable_cors) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path: parts.uri.path(),
                query: parts.uri.query(),
                is_head: parts.method == Method::HEAD,
                range_header: parts.headers.get("range").and_then(|v| v.to_str().ok()),
            };
            dispatch(&ctx, &state).await
        }
    };

    apply_common_headers(&mut response, &state);
    Ok(response)
}

/// Check HTTP method and return early response if not GET/HEAD
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

async fn dispatch(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    match &state.mode {
        ServeMode::FixedFile(path) => static_files::serve_fixed_file(ctx, path).await,
        ServeMode::Directory { root } => {
            let site = &state.config.site;
            static_files::serve_from_root(ctx, root, &site.index_files, site.directory_listing)
                .await
        }
    }
}

fn apply_common_headers(response: &mut Response<ResponseBody>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert("Server", server);
    }
    if state.config.http.enable_cors {
        headers.insert(
            "Access-Control-Allow-Origin",
            HeaderValue::from_static("*"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::StatusCode;
    use std::path::Path;

    fn state_for(overrides: Overrides) -> Arc<AppState> {
        let config = Config::load_from("no-such-config-file", &overrides).unwrap();
        Arc::new(AppState::new(config).unwrap())
    }

    fn directory_state(root: &Path) -> Arc<AppState> {
        state_for(Overrides {
            root_dir: Some(root.to_string_lossy().into_owned()),
            ..Overrides::default()
        })
    }

    fn fixed_file_state(file: &Path) -> Arc<AppState> {
        state_for(Overrides {
            file_path: Some(file.to_string_lossy().into_owned()),
            ..Overrides::default()
        })
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        range: Option<&str>,
    ) -> (StatusCode, hyper::HeaderMap, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(r) = range {
            builder = builder.header("Range", r);
        }
        let req = builder.body(()).unwrap();
        let response = handle_request(req, Arc::clone(state)).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Hi</h1>").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/notes.txt"), "0123456789").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_directory_mode_serves_file() {
        let dir = site();
        let state = directory_state(dir.path());

        let (status, headers, body) = send(&state, Method::GET, "/index.html", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Hi</h1>");
        assert!(headers["Content-Type"]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert_eq!(headers["Server"], "static_server");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let dir = site();
        let state = directory_state(dir.path());

        let (status, _, body) = send(&state, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = site();
        let state = directory_state(dir.path());

        let (status, _, _) = send(&state, Method::GET, "/style.css", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = site();
        let state = directory_state(&dir.path().join("docs"));

        let (status, _, body) = send(&state, Method::GET, "/../index.html", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_ne!(body, "<h1>Hi</h1>");

        let (status, _, _) = send(&state, Method::GET, "/%2e%2e/index.html", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_directory_redirect_and_listing() {
        let dir = site();
        let state = directory_state(dir.path());

        let (status, headers, _) = send(&state, Method::GET, "/docs?x=1", None).await;
        assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(headers["Location"], "./docs/?x=1");

        let (status, _, body) = send(&state, Method::GET, "/docs/", None).await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("<a href=\"notes.txt\">notes.txt</a>"));
    }

    #[tokio::test]
    async fn test_redirect_stays_on_host() {
        let dir = site();
        std::fs::create_dir(dir.path().join("evil.example")).unwrap();
        let state = directory_state(dir.path());

        let (status, headers, _) = send(&state, Method::GET, "//evil.example", None).await;
        assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
        let location = headers["Location"].to_str().unwrap();
        assert!(!location.starts_with("//"), "{location}");
        assert_eq!(location, "./evil.example/");
    }

    #[tokio::test]
    async fn test_listing_disabled_is_403() {
        let dir = site();
        let mut config = Config::load_from("no-such-config-file", &Overrides::default()).unwrap();
        config.site.root_dir = Some(dir.path().to_string_lossy().into_owned());
        config.site.directory_listing = false;
        let state = Arc::new(AppState::new(config).unwrap());

        let (status, _, _) = send(&state, Method::GET, "/docs/", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_index_symlink_outside_root_is_403() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("private.html"), "top secret").unwrap();
        let root = outer.path().join("public");
        std::fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(outer.path().join("private.html"), root.join("index.html"))
            .unwrap();
        let state = directory_state(&root);

        let (status, _, body) = send(&state, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_ne!(body, "top secret");
    }

    #[tokio::test]
    async fn test_fixed_file_mode() {
        let dir = site();
        let state = fixed_file_state(&dir.path().join("index.html"));

        for uri in ["/", "/anything/else.css", "/../../etc/passwd"] {
            let (status, _, body) = send(&state, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body, "<h1>Hi</h1>");
        }

        std::fs::remove_file(dir.path().join("index.html")).unwrap();
        let (status, _, _) = send(&state, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fixed_file_permission_denied_is_403() {
        use std::os::unix::fs::PermissionsExt;

        let dir = site();
        let file = dir.path().join("index.html");
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::File::open(&file).is_ok() {
            // Running with privileges that ignore file modes
            return;
        }
        let state = fixed_file_state(&file);

        let (status, _, body) = send(&state, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_ne!(body, "<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_methods() {
        let dir = site();
        let state = directory_state(dir.path());

        let (status, headers, body) = send(&state, Method::HEAD, "/index.html", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["Content-Length"], "11");
        assert!(body.is_empty());

        let (status, headers, _) = send(&state, Method::POST, "/index.html", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(headers.contains_key("Allow"));

        let (status, _, _) = send(&state, Method::OPTIONS, "/", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_range_requests() {
        let dir = site();
        let state = directory_state(dir.path());

        let (status, headers, body) =
            send(&state, Method::GET, "/docs/notes.txt", Some("bytes=0-3")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(headers["Content-Range"], "bytes 0-3/10");
        assert_eq!(body, "0123");

        let (status, _, body) =
            send(&state, Method::GET, "/docs/notes.txt", Some("bytes=-3")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body, "789");

        let (status, _, _) =
            send(&state, Method::GET, "/docs/notes.txt", Some("bytes=50-")).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let dir = site();
        let state = directory_state(dir.path());

        let (_, _, first) = send(&state, Method::GET, "/docs/notes.txt", None).await;
        for _ in 0..5 {
            let (status, _, body) = send(&state, Method::GET, "/docs/notes.txt", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, first);
        }
    }
}
