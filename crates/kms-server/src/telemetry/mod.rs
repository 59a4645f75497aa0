//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No key material** (master, derived, or data keys) must appear in any
//!   span attribute or log field. Key IDs and sealed-key lengths are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
