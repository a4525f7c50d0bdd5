//! WebSocket proxy handling.
//!
//! # Responsibilities
//! - Complete the upgrade handshake with the client
//! - Dial the upstream WebSocket (TLS settings follow the proxy config)
//! - Relay frames in both directions until either side closes
//!
//! # Data Flow
//! ```text
//! Client ←── frames ──→ Proxy ←── frames ──→ Upstream
//! ```
//!
//! # Design Decisions
//! - Frame-level forwarding, no message buffering
//! - Close frames propagated in both directions
//! - Ping/pong forwarded transparently
//! - A relay error tears down both halves of the bridge

use axum::body::Body;
use axum::extract::ws::{CloseFrame as ClientCloseFrame, Message as ClientMessage, WebSocket, WebSocketUpgrade};
use axum::http::{header, HeaderMap, Response};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio_tungstenite::tungstenite::protocol::CloseFrame as UpstreamCloseFrame;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tokio_tungstenite::Connector;
use url::Url;

#[derive(Debug, Error)]
enum RelayError {
    #[error("tls setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("upstream websocket error: {0}")]
    Upstream(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("client websocket error: {0}")]
    Client(#[from] axum::Error),
}

/// Whether a request asks for a WebSocket upgrade.
pub fn is_upgrade_request(headers: &HeaderMap) -> bool {
    let connection_has_upgrade = headers
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("upgrade"))
        });

    let upgrade_is_websocket = headers
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("websocket"));

    connection_has_upgrade && upgrade_is_websocket
}

/// Accept the client upgrade and bridge it to the upstream target.
pub fn handle_upgrade(upgrade: WebSocketUpgrade, target: Url, insecure_tls: bool) -> Response<Body> {
    tracing::debug!(target = %target, "WebSocket upgrade");
    upgrade.on_upgrade(move |client| async move {
        if let Err(err) = relay(client, &target, insecure_tls).await {
            tracing::warn!(target = %target, error = %err, "WebSocket relay ended with error");
        }
    })
}

/// Connect upstream and forward frames both ways until one side closes.
async fn relay(client: WebSocket, target: &Url, insecure_tls: bool) -> Result<(), RelayError> {
    let connector = if insecure_tls {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;
        Some(Connector::NativeTls(tls))
    } else {
        None
    };

    let (upstream, _handshake_response) =
        tokio_tungstenite::connect_async_tls_with_config(target.as_str(), None, false, connector)
            .await?;

    tracing::debug!(target = %target, "WebSocket upstream connected");

    let (mut upstream_tx, mut upstream_rx) = upstream.split();
    let (mut client_tx, mut client_rx) = client.split();

    let client_to_upstream = async {
        while let Some(message) = client_rx.next().await {
            let message = message?;
            let closing = matches!(message, ClientMessage::Close(_));
            upstream_tx.send(client_to_upstream_message(message)).await?;
            if closing {
                break;
            }
        }
        Ok::<(), RelayError>(())
    };

    let upstream_to_client = async {
        while let Some(message) = upstream_rx.next().await {
            let message = message?;
            let closing = matches!(message, UpstreamMessage::Close(_));
            if let Some(converted) = upstream_to_client_message(message) {
                client_tx.send(converted).await?;
            }
            if closing {
                break;
            }
        }
        Ok::<(), RelayError>(())
    };

    // Whichever direction finishes first ends the bridge; dropping the
    // halves closes the other side.
    tokio::select! {
        result = client_to_upstream => result,
        result = upstream_to_client => result,
    }
}

fn client_to_upstream_message(message: ClientMessage) -> UpstreamMessage {
    match message {
        ClientMessage::Text(text) => UpstreamMessage::Text(text.as_str().into()),
        ClientMessage::Binary(data) => UpstreamMessage::Binary(data),
        ClientMessage::Ping(data) => UpstreamMessage::Ping(data),
        ClientMessage::Pong(data) => UpstreamMessage::Pong(data),
        ClientMessage::Close(frame) => UpstreamMessage::Close(frame.map(|frame| UpstreamCloseFrame {
            code: frame.code.into(),
            reason: frame.reason.as_str().into(),
        })),
    }
}

fn upstream_to_client_message(message: UpstreamMessage) -> Option<ClientMessage> {
    match message {
        UpstreamMessage::Text(text) => Some(ClientMessage::Text(text.as_str().into())),
        UpstreamMessage::Binary(data) => Some(ClientMessage::Binary(data)),
        UpstreamMessage::Ping(data) => Some(ClientMessage::Ping(data)),
        UpstreamMessage::Pong(data) => Some(ClientMessage::Pong(data)),
        UpstreamMessage::Close(frame) => Some(ClientMessage::Close(frame.map(|frame| {
            ClientCloseFrame {
                code: frame.code.into(),
                reason: frame.reason.as_str().into(),
            }
        }))),
        // Raw frames never surface from a configured stream.
        UpstreamMessage::Frame(_) => None,
    }
}
