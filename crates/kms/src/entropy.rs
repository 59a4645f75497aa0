//! Cryptographically secure random source used for data keys and nonces.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use thiserror::Error;

/// The random source could not fill the requested buffer.
#[derive(Debug, Error)]
#[error("entropy source failure: {0}")]
pub struct EntropyError(pub String);

/// Fills buffers with cryptographically secure random bytes or fails.
///
/// A failure is never retried by the KMS layer.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dst: &mut [u8]) -> Result<(), EntropyError>;
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dst: &mut [u8]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dst)
            .map_err(|e| EntropyError(e.to_string()))
    }
}
