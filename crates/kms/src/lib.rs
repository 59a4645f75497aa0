//! Key-management abstraction and envelope-key sealing.
//!
//! [`Kms`] is the capability set every backend provides. [`MasterKeyKms`] is
//! the self-contained backend: it derives a per-request subkey from a single
//! 256-bit master key, the key ID, and a [`Context`], then seals a fresh
//! random data key under that subkey.
//!
//! # Security invariants
//!
//! - Plaintext data keys, derived keys and the master key are **never**
//!   logged; their `Debug` output is redacted and their bytes are zeroed on drop.
//! - A sealed 32-byte data key is always exactly [`SEALED_KEY_LEN`] bytes.
//! - Entropy or sealing failures go through a [`FaultHandler`] and never yield
//!   a key.

pub mod backend;
pub mod context;
pub mod derive;
pub mod entropy;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod keys;

pub use backend::{Kms, KmsInfo, MasterKeyKms};
pub use context::Context;
pub use derive::derive_key;
pub use entropy::{EntropySource, OsEntropy};
pub use envelope::SEALED_KEY_LEN;
pub use error::{FatalError, KeyParseError, KmsError};
pub use fault::{AbortOnFault, FaultHandler};
pub use keys::{DataKey, DerivedKey, MasterKey, SealedKey, KEY_LEN};
