//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use kms::Kms;

/// Application state shared across all request handlers.
///
/// The KMS handle is `Arc`-wrapped so Axum can clone the state per request.
/// Any backend implementing [`Kms`] can be served.
#[derive(Clone)]
pub struct AppState {
    pub kms: Arc<dyn Kms>,
}

impl AppState {
    /// Create a new [`AppState`] serving `kms`.
    pub fn new(kms: Arc<dyn Kms>) -> Self {
        Self { kms }
    }
}

#[cfg(test)]
impl Default for AppState {
    /// A master-key backend with an all-zero key, suitable for tests.
    fn default() -> Self {
        Self::new(Arc::new(kms::MasterKeyKms::new(
            "default",
            kms::MasterKey::new([0u8; kms::KEY_LEN]),
        )))
    }
}
