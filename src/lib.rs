//! Static site server with a reverse-proxy escape hatch.
//!
//! Serves a pre-built single-page-application bundle, forwards one
//! configured path prefix to an external upstream (HTTP and WebSocket),
//! and answers every other route with the entry HTML document.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────┐
//!                    │                SITE SERVER                 │
//!                    │                                            │
//!   Client Request   │   ┌──────────┐     ┌───────────────────┐  │
//!   ─────────────────┼──▶│  http    │────▶│ 1. static assets  │──┼──▶ build dir
//!                    │   │  server  │     ├───────────────────┤  │
//!                    │   └──────────┘     │ 2. proxy prefix   │──┼──▶ upstream
//!                    │                    ├───────────────────┤  │    (HTTP + WS)
//!                    │                    │ 3. SPA fallback   │──┼──▶ index.html
//!                    │                    └───────────────────┘  │
//!                    │                                            │
//!                    │   ┌────────────────────────────────────┐  │
//!                    │   │       Cross-Cutting Concerns       │  │
//!                    │   │   ┌────────┐     ┌─────────────┐   │  │
//!                    │   │   │ config │     │observability│   │  │
//!                    │   │   └────────┘     └─────────────┘   │  │
//!                    │   └────────────────────────────────────┘  │
//!                    └────────────────────────────────────────────┘
//! ```
//!
//! The three handlers form an ordered chain: the first one that produces
//! a response wins, the rest are never consulted for that request.

// Core subsystems
pub mod config;
pub mod http;
pub mod proxy;
pub mod site;

// Cross-cutting concerns
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
