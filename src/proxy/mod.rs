//! Reverse-proxy subsystem.
//!
//! # Data Flow
//! ```text
//! request under the proxy prefix
//!     → forward.rs (strip prefix, rewrite Host, stream request/response)
//!     → upstream origin
//!
//! upgrade request under the proxy prefix
//!     → websocket.rs (complete client handshake, dial upstream, relay frames)
//! ```
//!
//! # Design Decisions
//! - One fixed route: prefix → upstream origin, immutable after startup
//! - Upstream failures become a 502 with a plain-text diagnostic; no retries
//! - TLS verification toward the upstream is relaxed only when configured

pub mod forward;
pub mod websocket;

pub use forward::{ProxyClient, ProxyError};
