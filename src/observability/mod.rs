//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via the tracing crate
//! - `RUST_LOG` wins over the configured default filter
//! - Request-level spans come from tower-http's `TraceLayer`

pub mod logging;
