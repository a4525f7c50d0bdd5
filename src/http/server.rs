//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all handler
//! - Wire up middleware (tracing)
//! - Bind the server to a listener
//! - Dispatch requests through the ordered handler chain:
//!   static asset → proxy prefix → SPA fallback
//!
//! # Design Decisions
//! - A single catch-all route; matching is an explicit ordered chain, so
//!   exactly one handler writes each response
//! - All shared state is read-only after startup; no locking anywhere

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ws::WebSocketUpgrade, FromRequestParts, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::proxy::websocket;
use crate::proxy::{ProxyClient, ProxyError};
use crate::site::{assets, fallback, SiteState};

/// Application state injected into the handler.
///
/// Everything here is immutable after startup and shared by cheap clones.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteState>,
    pub proxy: Arc<ProxyClient>,
}

/// HTTP server for the static site and its proxy route.
pub struct HttpServer {
    router: Router,
    site: Arc<SiteState>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, ProxyError> {
        let site = Arc::new(SiteState::from_config(&config.site));
        let proxy = Arc::new(ProxyClient::new(&config.proxy)?);

        let state = AppState {
            site: site.clone(),
            proxy,
        };

        Ok(Self {
            router: Self::build_router(state),
            site,
        })
    }

    /// Build the Axum router with the catch-all dispatch handler.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            build_version = %self.site.build_version,
            "Site server listening"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Ordered handler chain; the first match wins.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();
    let read_only = request.method() == Method::GET || request.method() == Method::HEAD;

    // 1. Static asset lookup, GET/HEAD only (misses fall through).
    if read_only {
        if let Some(response) = assets::try_serve(&state.site.build_dir, &path).await {
            return response;
        }
    }

    // 2. Proxy prefix.
    if state.proxy.matches(&path) {
        if websocket::is_upgrade_request(request.headers()) {
            let target = state.proxy.websocket_url(&path, request.uri().query());
            let (mut parts, _body) = request.into_parts();
            return match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
                Ok(upgrade) => {
                    websocket::handle_upgrade(upgrade, target, state.proxy.insecure_tls())
                }
                Err(rejection) => rejection.into_response(),
            };
        }
        return state.proxy.forward(request).await;
    }

    // 3. SPA fallback, GET/HEAD only.
    if !read_only {
        return StatusCode::NOT_FOUND.into_response();
    }
    fallback::serve_index(&state.site).await
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
