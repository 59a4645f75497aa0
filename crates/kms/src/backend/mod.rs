//! The KMS capability set and its backends.
//!
//! Callers hold an `Arc<dyn Kms>` and never depend on a concrete backend, so
//! a networked KMS can be added behind the same trait without touching them.

pub mod master_key;

pub use master_key::MasterKeyKms;

use serde::Serialize;

use crate::context::Context;
use crate::error::KmsError;
use crate::keys::{DataKey, SealedKey};

/// An active, authenticated handle to a Key-Management-Service.
pub trait Kms: Send + Sync {
    /// The key ID to use when a caller asks for KMS encryption without
    /// naming a key.
    fn default_key_id(&self) -> &str;

    /// Create a new master key with the given ID at the KMS.
    fn create_key(&self, key_id: &str) -> Result<(), KmsError>;

    /// Generate a new random data key protected by the master key `key_id`.
    ///
    /// Returns the plaintext key and its sealed form. `context` is bound to
    /// the sealed key; the same context must be supplied to unseal it.
    fn generate_key(
        &self,
        key_id: &str,
        context: Option<&Context>,
    ) -> Result<(DataKey, SealedKey), KmsError>;

    /// Recover the plaintext of a key produced by [`Kms::generate_key`].
    ///
    /// `key_id` and `context` must match the values used at generation.
    fn unseal_key(
        &self,
        key_id: &str,
        sealed_key: &[u8],
        context: Option<&Context>,
    ) -> Result<DataKey, KmsError>;

    /// Descriptive, non-secret information about the backend.
    fn info(&self) -> KmsInfo;
}

/// Describes a KMS backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KmsInfo {
    pub endpoints: Vec<String>,
    pub name: String,
    pub auth_type: String,
}
