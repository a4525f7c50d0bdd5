//! SPA fallback: the entry HTML document for client-side routes.
//!
//! # Responsibilities
//! - Read the entry document from the build directory
//! - Substitute every build-version placeholder occurrence
//! - Attach cache-disabling headers so clients always revalidate
//!
//! # Design Decisions
//! - A failed read-as-text degrades to serving the raw bytes unmodified;
//!   the client still gets a page rather than an error
//! - Only a completely missing entry document yields a 404

use std::io::ErrorKind;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;

use crate::site::SiteState;

const CACHE_DISABLED: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// Serve the entry document with the build version substituted in.
pub async fn serve_index(site: &SiteState) -> Response<Body> {
    match tokio::fs::read_to_string(&site.index_path).await {
        Ok(html) => {
            let html = render_index(&html, &site.version_placeholder, &site.build_version);
            index_response(Body::from(html))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::error!(path = %site.index_path.display(), "Entry document missing");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(err) => {
            // Unreadable as UTF-8 (or transient IO failure): degrade to the
            // raw bytes instead of failing the request.
            tracing::warn!(error = %err, "Entry document transform failed, serving raw file");
            match tokio::fs::read(&site.index_path).await {
                Ok(bytes) => index_response(Body::from(bytes)),
                Err(err) => {
                    tracing::error!(error = %err, "Entry document unreadable");
                    StatusCode::NOT_FOUND.into_response()
                }
            }
        }
    }
}

/// Replace every placeholder occurrence with the build version.
pub fn render_index(html: &str, placeholder: &str, build_version: &str) -> String {
    html.replace(placeholder, build_version)
}

fn index_response(body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    apply_no_cache_headers(response.headers_mut());
    response
}

/// Force revalidation at every caching layer, CDN surrogates included.
fn apply_no_cache_headers(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_DISABLED));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(
        HeaderName::from_static("surrogate-control"),
        HeaderValue::from_static("no-store"),
    );
}
