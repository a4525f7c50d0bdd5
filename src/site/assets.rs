//! Static asset serving.
//!
//! # Responsibilities
//! - Sanitize request paths (no traversal outside the build root)
//! - Resolve paths against the build directory
//! - Stream file bodies with an inferred content type
//! - Tag hashed asset types with a long-lived immutable cache header
//!
//! # Design Decisions
//! - A miss returns `None` so the caller can fall through the chain
//! - No directory listing; only regular files are served
//! - Hashed bundles get `max-age=31536000, immutable` since their names
//!   change on every build

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use tokio_util::io::ReaderStream;

/// File extensions whose names embed a content hash at build time.
pub const HASHED_ASSET_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "woff", "woff2", "ttf", "eot",
];

/// Cache header for hashed assets.
pub const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Serve the file the request path resolves to, or `None` on a miss.
///
/// Traversal attempts resolve to `None`, never to a file outside the root.
pub async fn try_serve(build_dir: &Path, request_path: &str) -> Option<Response<Body>> {
    let relative = sanitize_request_path(request_path)?;
    let full_path = build_dir.join(relative);

    let file = tokio::fs::File::open(&full_path).await.ok()?;
    let metadata = file.metadata().await.ok()?;
    if !metadata.is_file() {
        return None;
    }

    let mime = mime_guess::from_path(&full_path).first_or_octet_stream();
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, metadata.len());

    let mut response = builder.body(Body::from_stream(ReaderStream::new(file))).ok()?;
    if is_hashed_asset(request_path) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_IMMUTABLE));
    }

    tracing::debug!(path = %request_path, mime = %mime, "Serving static asset");
    Some(response)
}

/// Whether the path names a hashed-asset file type.
pub fn is_hashed_asset(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            HASHED_ASSET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Turn a URL path into a safe path relative to the build root.
///
/// Rejects `..` and backslash segments outright; empty and `.` segments are
/// skipped. Returns `None` when nothing servable remains.
pub fn sanitize_request_path(request_path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            segment if segment.contains('\\') => return None,
            segment => clean.push(segment),
        }
    }

    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_accepts_nested_path() {
        assert_eq!(
            sanitize_request_path("/static/js/main.8f3b2c1a.js"),
            Some(PathBuf::from("static/js/main.8f3b2c1a.js"))
        );
    }

    #[test]
    fn sanitize_rejects_parent_traversal() {
        assert_eq!(sanitize_request_path("/../../etc/passwd"), None);
        assert_eq!(sanitize_request_path("/static/../../secret"), None);
    }

    #[test]
    fn sanitize_rejects_backslash_segments() {
        assert_eq!(sanitize_request_path("/..\\..\\secret"), None);
    }

    #[test]
    fn sanitize_skips_empty_and_dot_segments() {
        assert_eq!(
            sanitize_request_path("//static/./app.css"),
            Some(PathBuf::from("static/app.css"))
        );
        assert_eq!(sanitize_request_path("/"), None);
    }

    #[test]
    fn hashed_asset_extensions_match_case_insensitively() {
        assert!(is_hashed_asset("/static/js/main.8f3b2c1a.js"));
        assert!(is_hashed_asset("/logo.SVG"));
        assert!(is_hashed_asset("/fonts/inter.woff2"));
        assert!(!is_hashed_asset("/index.html"));
        assert!(!is_hashed_asset("/api/health"));
    }
}
