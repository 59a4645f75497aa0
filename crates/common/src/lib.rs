//! Common types, protocol definitions, and errors shared across `master-kms` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
