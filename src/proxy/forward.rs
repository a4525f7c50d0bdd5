//! HTTP forwarding to the upstream origin.
//!
//! # Responsibilities
//! - Match request paths against the configured prefix (segment boundary)
//! - Rewrite the URL: prefix stripped, upstream origin, query preserved
//! - Forward method, headers, and body; relay status, headers, and body
//! - Surface upstream failures as an explicit 502 diagnostic
//!
//! # Design Decisions
//! - The `Host` header is dropped so the client derives it from the
//!   upstream URL ("change origin" semantics)
//! - Hop-by-hop headers are stripped in both directions
//! - Bodies are streamed, never buffered whole

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyRouteConfig;

/// Headers scoped to a single hop, never forwarded.
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Error constructing the proxy at startup.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid upstream URL: {0}")]
    Upstream(#[from] url::ParseError),
}

/// Forwards requests under a fixed path prefix to a fixed upstream origin.
///
/// Immutable after construction; shared across requests without locking.
#[derive(Debug)]
pub struct ProxyClient {
    client: reqwest::Client,
    prefix: String,
    upstream: Url,
    insecure_tls: bool,
}

impl ProxyClient {
    /// Build the upstream client from a validated route config.
    pub fn new(route: &ProxyRouteConfig) -> Result<Self, ProxyError> {
        let upstream = Url::parse(&route.upstream)?;
        // Redirects are relayed to the caller, never followed here.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(route.insecure_tls)
            .build()?;

        Ok(Self {
            client,
            prefix: route.path_prefix.clone(),
            upstream,
            insecure_tls: route.insecure_tls,
        })
    }

    /// Whether the path falls under the proxy prefix.
    ///
    /// Matches on segment boundaries: `/sales-agent` and `/sales-agent/x`
    /// match, `/sales-agentx` does not.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Whether upstream TLS verification is relaxed.
    pub fn insecure_tls(&self) -> bool {
        self.insecure_tls
    }

    /// Rewrite a request path into the upstream URL (prefix → empty string).
    pub fn rewrite_url(&self, path: &str, query: Option<&str>) -> Url {
        let stripped = path.strip_prefix(self.prefix.as_str()).unwrap_or(path);
        let mut url = self.upstream.clone();
        url.set_path(stripped);
        url.set_query(query);
        url
    }

    /// The upstream URL for a WebSocket upgrade of the same path.
    pub fn websocket_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.rewrite_url(path, query);
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) → ws(s) stays within the URL spec's special schemes.
        let _ = url.set_scheme(scheme);
        url
    }

    /// Forward one request upstream and relay the response.
    ///
    /// Failures are reported to the caller once, as a 502 diagnostic; they
    /// are never retried and never crash the process.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        let (parts, body) = request.into_parts();
        let url = self.rewrite_url(parts.uri.path(), parts.uri.query());

        tracing::debug!(method = %parts.method, url = %url, "Forwarding to upstream");

        let mut headers = parts.headers;
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        strip_hop_by_hop(&mut headers);

        let upstream_request = self
            .client
            .request(parts.method, url.clone())
            .headers(headers)
            .body(reqwest::Body::wrap_stream(body.into_data_stream()));

        match upstream_request.send().await {
            Ok(upstream_response) => {
                let status = upstream_response.status();
                tracing::info!(status = %status, url = %url, "Proxy response");

                let mut headers = upstream_response.headers().clone();
                strip_hop_by_hop(&mut headers);

                let mut response = Response::new(Body::from_stream(upstream_response.bytes_stream()));
                *response.status_mut() = status;
                *response.headers_mut() = headers;
                response
            }
            Err(err) => {
                tracing::error!(error = %err, url = %url, "Upstream request failed");
                proxy_error_response(&err.to_string())
            }
        }
    }
}

/// Plain-text diagnostic for an upstream failure.
pub fn proxy_error_response(detail: &str) -> Response<Body> {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Something went wrong with the proxy: {detail}"),
    )
        .into_response()
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Connection's own token list nominates additional hop-by-hop headers.
    let nominated: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| token.trim().parse::<HeaderName>().ok())
        .collect();
    for name in nominated {
        headers.remove(name);
    }

    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ProxyClient {
        ProxyClient::new(&ProxyRouteConfig {
            path_prefix: "/sales-agent".to_string(),
            upstream: "https://demo.example.net".to_string(),
            insecure_tls: false,
        })
        .unwrap()
    }

    #[test]
    fn matches_only_on_segment_boundary() {
        let proxy = client();
        assert!(proxy.matches("/sales-agent"));
        assert!(proxy.matches("/sales-agent/health"));
        assert!(!proxy.matches("/sales-agents"));
        assert!(!proxy.matches("/other"));
    }

    #[test]
    fn rewrite_strips_prefix_and_keeps_query() {
        let proxy = client();
        let url = proxy.rewrite_url("/sales-agent/health", Some("probe=1"));
        assert_eq!(url.as_str(), "https://demo.example.net/health?probe=1");
    }

    #[test]
    fn rewrite_of_bare_prefix_hits_upstream_root() {
        let proxy = client();
        let url = proxy.rewrite_url("/sales-agent", None);
        assert_eq!(url.as_str(), "https://demo.example.net/");
    }

    #[test]
    fn websocket_url_flips_scheme() {
        let proxy = client();
        let url = proxy.websocket_url("/sales-agent/socket", None);
        assert_eq!(url.as_str(), "wss://demo.example.net/socket");
    }

    #[test]
    fn connection_nominated_headers_are_stripped() {
        use axum::http::HeaderValue;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONNECTION,
            HeaderValue::from_static("close, x-hop-token"),
        );
        headers.insert("x-hop-token", HeaderValue::from_static("per-hop"));
        headers.insert("x-end-to-end", HeaderValue::from_static("kept"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("x-hop-token").is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert_eq!(headers["x-end-to-end"], "kept");
    }

    #[test]
    fn error_body_carries_diagnostic_prefix() {
        let response = proxy_error_response("connection refused");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }
}
