//! Fixed-size key buffers and the opaque sealed-key blob.

use std::fmt;

use crate::error::KeyParseError;

/// Byte length of every master, derived, and data key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

macro_rules! secret_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name([u8; KEY_LEN]);

        impl Drop for $name {
            fn drop(&mut self) {
                // Zero the key material on drop.
                self.0.iter_mut().for_each(|b| *b = 0);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Never print key material, not even in debug builds.
                f.write_str(concat!(stringify!($name), "([REDACTED])"))
            }
        }
    };
}

secret_key! {
    /// The long-lived 256-bit secret held by a [`MasterKeyKms`](crate::MasterKeyKms).
    ///
    /// There is deliberately no public accessor for the raw bytes.
    MasterKey
}

secret_key! {
    /// A freshly generated 256-bit data key in plaintext form.
    DataKey
}

secret_key! {
    /// A subkey computed from the master key, a key ID, and a context.
    DerivedKey
}

impl MasterKey {
    /// Wrap raw master key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a `<key-id>:<hex-encoded-key>` string.
    ///
    /// The hex part must decode to exactly [`KEY_LEN`] bytes and the key ID
    /// must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyParseError`] describing the first malformed part.
    pub fn parse(s: &str) -> Result<(String, Self), KeyParseError> {
        let (key_id, encoded) = s.split_once(':').ok_or(KeyParseError::MissingSeparator)?;
        let key_id = key_id.trim();
        if key_id.is_empty() {
            return Err(KeyParseError::EmptyKeyId);
        }

        let decoded = hex::decode(encoded.trim()).map_err(|_| KeyParseError::InvalidHex)?;
        if decoded.len() != KEY_LEN {
            return Err(KeyParseError::InvalidLength(decoded.len()));
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        Ok((key_id.to_owned(), Self(bytes)))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl DataKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the plaintext key bytes.
    ///
    /// Use and drop promptly; never log or persist the result.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// A data key sealed under a derived key. Safe to persist and transmit.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedKey(Vec<u8>);

impl SealedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for SealedKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for SealedKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SealedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealedKey({})", hex::encode(&self.0))
    }
}
