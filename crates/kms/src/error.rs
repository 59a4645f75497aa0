//! Error types of the KMS layer.

use thiserror::Error;

use crate::keys::KEY_LEN;

/// Errors returned by [`Kms`](crate::Kms) operations.
///
/// [`KmsError::Unsupported`] and [`KmsError::Unseal`] are ordinary errors for
/// the immediate caller. [`KmsError::Fatal`] means the security state of the
/// backend may be broken; it has already been reported to the backend's
/// [`FaultHandler`](crate::FaultHandler) and must be propagated to a top-level
/// handler, never retried.
#[derive(Debug, Error)]
pub enum KmsError {
    /// The backend does not implement this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Authentication or length check failed while unsealing.
    ///
    /// Carries no detail: a wrong key ID, a different context and a tampered
    /// blob are indistinguishable by design of the primitive.
    #[error("key/context/keyID mismatch or corrupted sealed key")]
    Unseal,

    /// A trusted primitive violated its contract.
    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),
}

impl KmsError {
    /// Returns `true` for errors that must halt the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, KmsError::Fatal(_))
    }
}

/// Primitive failures that must never be downgraded to a recoverable error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// The random source could not supply entropy for a data key.
    #[error("out of entropy: unable to generate a random data key")]
    OutOfEntropy,

    /// Sealing a data key failed or produced an unexpected length.
    #[error("unable to seal data key: {0}")]
    SealFailure(String),
}

/// Errors produced while parsing a `<key-id>:<hex>` master key string.
#[derive(Debug, Error)]
pub enum KeyParseError {
    /// No `:` between the key ID and the key.
    #[error("master key must have the form <key-id>:<hex-key>")]
    MissingSeparator,

    #[error("master key ID must not be empty")]
    EmptyKeyId,

    #[error("master key is not valid hex")]
    InvalidHex,

    #[error("master key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}
