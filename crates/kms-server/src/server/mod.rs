//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject the shared KMS handle (`AppState`) into handlers.
//! - Map KMS errors onto HTTP status codes without leaking detail.

pub mod handlers;
pub mod router;
pub mod state;
