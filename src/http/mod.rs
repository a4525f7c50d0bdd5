//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace layer)
//!     → dispatch: static asset → proxy prefix → SPA fallback
//!     → Send to client
//! ```

pub mod server;

pub use server::HttpServer;
