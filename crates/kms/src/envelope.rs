//! AES-256-GCM-SIV sealing of data keys under a derived key.
//!
//! # Sealed format
//!
//! ```text
//! offset  len  field
//! 0       1    version       (0x10)
//! 1       1    cipher suite  (0x01 = AES-256-GCM-SIV)
//! 2       2    payload length - 1, little endian
//! 4       12   random nonce
//! 16      n    ciphertext
//! 16+n    16   authentication tag
//! ```
//!
//! The header is authenticated as associated data, so a modified header fails
//! the tag check exactly like a modified ciphertext. The framing overhead is a
//! constant [`OVERHEAD`] bytes; a 32-byte data key always seals to
//! [`SEALED_KEY_LEN`] bytes. Changing the primitive means recomputing both.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, Payload},
    Aes256GcmSiv, Nonce,
};
use thiserror::Error;

use crate::entropy::EntropySource;
use crate::keys::{DerivedKey, KEY_LEN};

/// Current format version.
pub const VERSION: u8 = 0x10;

/// Cipher suite identifier for AES-256-GCM-SIV.
pub const SUITE_AES_256_GCM_SIV: u8 = 0x01;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the AES-GCM-SIV authentication tag.
pub const TAG_LEN: usize = 16;

/// Byte length of the authenticated header.
pub const HEADER_LEN: usize = 4 + NONCE_LEN;

/// Fixed number of bytes sealing adds to any payload.
pub const OVERHEAD: usize = HEADER_LEN + TAG_LEN;

/// Byte length of a sealed [`KEY_LEN`]-byte data key.
pub const SEALED_KEY_LEN: usize = KEY_LEN + OVERHEAD;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = 1 << 16;

/// Errors produced by the envelope layer.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The payload is empty or longer than [`MAX_PAYLOAD_LEN`].
    #[error("invalid payload length: {0}")]
    InvalidPayloadLength(usize),

    /// No nonce could be drawn from the entropy source.
    #[error("unable to generate nonce")]
    Entropy,

    /// The sealed blob is truncated, extended, or has an unknown header.
    #[error("malformed sealed data")]
    Malformed,

    /// AES-GCM-SIV encryption or authentication failed.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Seal `plaintext` under `key`.
///
/// A fresh random nonce is drawn from `entropy` per call.
///
/// # Errors
///
/// Returns [`EnvelopeError::InvalidPayloadLength`] for empty or oversized input,
/// [`EnvelopeError::Entropy`] if no nonce could be drawn and
/// [`EnvelopeError::AeadFailure`] on an internal AEAD error.
pub fn seal(
    key: &DerivedKey,
    plaintext: &[u8],
    entropy: &dyn EntropySource,
) -> Result<Vec<u8>, EnvelopeError> {
    if plaintext.is_empty() || plaintext.len() > MAX_PAYLOAD_LEN {
        return Err(EnvelopeError::InvalidPayloadLength(plaintext.len()));
    }
    let cipher = build_cipher(key)?;

    let mut header = [0u8; HEADER_LEN];
    header[0] = VERSION;
    header[1] = SUITE_AES_256_GCM_SIV;
    header[2..4].copy_from_slice(&((plaintext.len() - 1) as u16).to_le_bytes());
    entropy
        .fill(&mut header[4..])
        .map_err(|_| EnvelopeError::Entropy)?;

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&header[4..]),
            Payload {
                msg: plaintext,
                aad: &header,
            },
        )
        .map_err(|_| EnvelopeError::AeadFailure)?;

    let mut sealed = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    sealed.extend_from_slice(&header);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Authenticate and decrypt a blob produced by [`seal`].
///
/// # Errors
///
/// Returns [`EnvelopeError::Malformed`] if the header or overall length is
/// wrong and [`EnvelopeError::AeadFailure`] if authentication fails (wrong
/// key or tampered data).
pub fn unseal(key: &DerivedKey, sealed: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    if sealed.len() <= OVERHEAD {
        return Err(EnvelopeError::Malformed);
    }
    let (header, body) = sealed.split_at(HEADER_LEN);
    if header[0] != VERSION || header[1] != SUITE_AES_256_GCM_SIV {
        return Err(EnvelopeError::Malformed);
    }
    let payload_len = usize::from(u16::from_le_bytes([header[2], header[3]])) + 1;
    if body.len() != payload_len + TAG_LEN {
        return Err(EnvelopeError::Malformed);
    }

    let cipher = build_cipher(key)?;
    cipher
        .decrypt(
            Nonce::from_slice(&header[4..]),
            Payload {
                msg: body,
                aad: header,
            },
        )
        .map_err(|_| EnvelopeError::AeadFailure)
}

fn build_cipher(key: &DerivedKey) -> Result<Aes256GcmSiv, EnvelopeError> {
    Aes256GcmSiv::new_from_slice(key.as_bytes()).map_err(|_| EnvelopeError::AeadFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{EntropyError, OsEntropy};

    struct NoEntropy;

    impl EntropySource for NoEntropy {
        fn fill(&self, _dst: &mut [u8]) -> Result<(), EntropyError> {
            Err(EntropyError("exhausted".into()))
        }
    }

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes([byte; KEY_LEN])
    }

    #[test]
    fn overhead_is_32_bytes() {
        assert_eq!(OVERHEAD, 32);
        assert_eq!(SEALED_KEY_LEN, 64);
    }

    #[test]
    fn seal_unseal_round_trip() {
        let data = [0x5Au8; KEY_LEN];
        let sealed = seal(&key(1), &data, &OsEntropy).unwrap();
        assert_eq!(sealed.len(), SEALED_KEY_LEN);
        assert_eq!(unseal(&key(1), &sealed).unwrap(), data);
    }

    #[test]
    fn header_describes_payload() {
        let sealed = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        assert_eq!(sealed[0], VERSION);
        assert_eq!(sealed[1], SUITE_AES_256_GCM_SIV);
        assert_eq!(u16::from_le_bytes([sealed[2], sealed[3]]), 31);
    }

    #[test]
    fn nonce_differs_per_seal() {
        let a = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        let b = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        assert!(matches!(
            unseal(&key(2), &sealed),
            Err(EnvelopeError::AeadFailure)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let mut sealed = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        sealed[HEADER_LEN] ^= 0xFF;
        assert!(matches!(
            unseal(&key(1), &sealed),
            Err(EnvelopeError::AeadFailure)
        ));
    }

    #[test]
    fn tampered_nonce_fails_authentication() {
        let mut sealed = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        sealed[4] ^= 0x01;
        assert!(unseal(&key(1), &sealed).is_err());
    }

    #[test]
    fn truncated_and_extended_blobs_rejected() {
        let sealed = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        assert!(matches!(
            unseal(&key(1), &sealed[..sealed.len() - 1]),
            Err(EnvelopeError::Malformed)
        ));
        let mut extended = sealed.clone();
        extended.push(0);
        assert!(matches!(
            unseal(&key(1), &extended),
            Err(EnvelopeError::Malformed)
        ));
        assert!(matches!(unseal(&key(1), &[]), Err(EnvelopeError::Malformed)));
    }

    #[test]
    fn unknown_version_rejected() {
        let mut sealed = seal(&key(1), &[0u8; KEY_LEN], &OsEntropy).unwrap();
        sealed[0] = 0x20;
        assert!(matches!(
            unseal(&key(1), &sealed),
            Err(EnvelopeError::Malformed)
        ));
    }

    #[test]
    fn empty_payload_rejected() {
        assert!(matches!(
            seal(&key(1), &[], &OsEntropy),
            Err(EnvelopeError::InvalidPayloadLength(0))
        ));
    }

    #[test]
    fn entropy_failure_reported() {
        assert!(matches!(
            seal(&key(1), &[0u8; KEY_LEN], &NoEntropy),
            Err(EnvelopeError::Entropy)
        ));
    }
}
