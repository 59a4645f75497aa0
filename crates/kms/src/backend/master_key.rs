//! [`MasterKeyKms`]: a self-contained KMS built from a single 256-bit master key.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{Kms, KmsInfo};
use crate::context::Context;
use crate::derive::derive_key;
use crate::entropy::{EntropySource, OsEntropy};
use crate::envelope::{self, EnvelopeError, SEALED_KEY_LEN};
use crate::error::{FatalError, KeyParseError, KmsError};
use crate::fault::{AbortOnFault, FaultHandler};
use crate::keys::{DataKey, MasterKey, SealedKey, KEY_LEN};

/// Authentication type reported by [`MasterKeyKms::info`].
pub const AUTH_TYPE: &str = "master-key";

/// A KMS backed by one master key held in memory.
///
/// Any key ID is accepted. The key ID and the context are both mixed into the
/// derived key, so the same master key yields unrelated subkeys per key ID.
///
/// All state is immutable after construction; the type is cheap to clone and
/// safe to share across threads without locking.
#[derive(Clone)]
pub struct MasterKeyKms {
    key_id: String,
    master_key: Arc<MasterKey>,
    entropy: Arc<dyn EntropySource>,
    fault: Arc<dyn FaultHandler>,
}

impl MasterKeyKms {
    /// Create a backend whose default key ID is `key_id`.
    pub fn new(key_id: impl Into<String>, master_key: MasterKey) -> Self {
        Self {
            key_id: key_id.into(),
            master_key: Arc::new(master_key),
            entropy: Arc::new(OsEntropy),
            fault: Arc::new(AbortOnFault),
        }
    }

    /// Build a backend from a `<key-id>:<hex-key>` string.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyParseError`] if the string is malformed.
    pub fn from_config_str(s: &str) -> Result<Self, KeyParseError> {
        let (key_id, master_key) = MasterKey::parse(s)?;
        Ok(Self::new(key_id, master_key))
    }

    /// Replace the random source used for data keys and nonces.
    pub fn with_entropy(mut self, entropy: Arc<dyn EntropySource>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Replace the handler that receives fatal primitive failures.
    pub fn with_fault_handler(mut self, fault: Arc<dyn FaultHandler>) -> Self {
        self.fault = fault;
        self
    }

    fn fatal(&self, err: FatalError) -> KmsError {
        self.fault.critical(&err);
        KmsError::Fatal(err)
    }
}

impl fmt::Debug for MasterKeyKms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKeyKms")
            .field("key_id", &self.key_id)
            .field("master_key", &self.master_key)
            .finish_non_exhaustive()
    }
}

impl Kms for MasterKeyKms {
    fn default_key_id(&self) -> &str {
        &self.key_id
    }

    fn create_key(&self, _key_id: &str) -> Result<(), KmsError> {
        Err(KmsError::Unsupported(
            "creating keys is not supported by a static master key",
        ))
    }

    fn generate_key(
        &self,
        key_id: &str,
        context: Option<&Context>,
    ) -> Result<(DataKey, SealedKey), KmsError> {
        let mut bytes = [0u8; KEY_LEN];
        if self.entropy.fill(&mut bytes).is_err() {
            return Err(self.fatal(FatalError::OutOfEntropy));
        }
        let key = DataKey::from_bytes(bytes);
        bytes.iter_mut().for_each(|b| *b = 0);

        let derived = derive_key(&self.master_key, key_id, context);
        let sealed = match envelope::seal(&derived, key.as_bytes(), self.entropy.as_ref()) {
            Ok(sealed) if sealed.len() == SEALED_KEY_LEN => sealed,
            Ok(sealed) => {
                return Err(self.fatal(FatalError::SealFailure(format!(
                    "sealed key has {} bytes, expected {SEALED_KEY_LEN}",
                    sealed.len()
                ))))
            }
            Err(EnvelopeError::Entropy) => return Err(self.fatal(FatalError::OutOfEntropy)),
            Err(e) => return Err(self.fatal(FatalError::SealFailure(e.to_string()))),
        };

        debug!(key_id, sealed_len = sealed.len(), "generated data key");
        Ok((key, SealedKey::from(sealed)))
    }

    fn unseal_key(
        &self,
        key_id: &str,
        sealed_key: &[u8],
        context: Option<&Context>,
    ) -> Result<DataKey, KmsError> {
        if sealed_key.len() != SEALED_KEY_LEN {
            debug!(key_id, sealed_len = sealed_key.len(), "rejected sealed key of wrong length");
            return Err(KmsError::Unseal);
        }

        let derived = derive_key(&self.master_key, key_id, context);
        let mut plaintext = envelope::unseal(&derived, sealed_key).map_err(|_| {
            debug!(key_id, "unable to unseal data key");
            KmsError::Unseal
        })?;

        let result = if plaintext.len() == KEY_LEN {
            let mut bytes = [0u8; KEY_LEN];
            bytes.copy_from_slice(&plaintext);
            let key = DataKey::from_bytes(bytes);
            bytes.iter_mut().for_each(|b| *b = 0);
            Ok(key)
        } else {
            Err(KmsError::Unseal)
        };
        plaintext.iter_mut().for_each(|b| *b = 0);
        result
    }

    fn info(&self) -> KmsInfo {
        KmsInfo {
            endpoints: Vec::new(),
            name: String::new(),
            auth_type: AUTH_TYPE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::EntropyError;
    use crate::envelope::HEADER_LEN;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFault(Mutex<Vec<FatalError>>);

    impl FaultHandler for RecordingFault {
        fn critical(&self, err: &FatalError) {
            self.0.lock().unwrap().push(err.clone());
        }
    }

    /// Succeeds for the first `ok` fills, then fails.
    struct FailingEntropy {
        ok: usize,
        calls: AtomicUsize,
    }

    impl EntropySource for FailingEntropy {
        fn fill(&self, dst: &mut [u8]) -> Result<(), EntropyError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.ok {
                OsEntropy.fill(dst)
            } else {
                Err(EntropyError("exhausted".into()))
            }
        }
    }

    fn zero_kms() -> MasterKeyKms {
        MasterKeyKms::new("default", MasterKey::new([0u8; KEY_LEN]))
    }

    fn object_context(object: &str) -> Context {
        Context::from([("bucket", "b1"), ("object", object)])
    }

    #[test]
    fn generate_then_unseal_with_same_inputs() {
        let kms = zero_kms();
        let ctx = object_context("o1");
        let (key, sealed) = kms.generate_key("default", Some(&ctx)).unwrap();
        assert_eq!(sealed.len(), SEALED_KEY_LEN);

        let unsealed = kms.unseal_key("default", sealed.as_bytes(), Some(&ctx)).unwrap();
        assert_eq!(unsealed, key);
    }

    #[test]
    fn different_object_fails_unseal() {
        let kms = zero_kms();
        let (_, sealed) = kms
            .generate_key("default", Some(&object_context("o1")))
            .unwrap();
        let err = kms
            .unseal_key("default", sealed.as_bytes(), Some(&object_context("o2")))
            .unwrap_err();
        assert!(matches!(err, KmsError::Unseal));
    }

    #[test]
    fn different_key_id_fails_unseal() {
        let kms = zero_kms();
        let ctx = Context::from([("x", "1")]);
        let (_, sealed) = kms.generate_key("A", Some(&ctx)).unwrap();
        assert!(matches!(
            kms.unseal_key("B", sealed.as_bytes(), Some(&ctx)),
            Err(KmsError::Unseal)
        ));
    }

    #[test]
    fn missing_context_unseals_with_empty_context() {
        let kms = zero_kms();
        let (key, sealed) = kms.generate_key("default", None).unwrap();
        let unsealed = kms
            .unseal_key("default", sealed.as_bytes(), Some(&Context::new()))
            .unwrap();
        assert_eq!(unsealed, key);
        assert!(kms
            .unseal_key("default", sealed.as_bytes(), Some(&Context::from([("a", "1")])))
            .is_err());
    }

    #[test]
    fn round_trip_across_key_ids_and_contexts() {
        let kms = zero_kms();
        let contexts = [
            Context::new(),
            Context::from([("k", "v")]),
            Context::from([("bucket", "photos"), ("object", "2024/01/cat.jpg")]),
            Context::from([("", ""), ("unicode", "ключ")]),
        ];
        for key_id in ["", "default", "tenant-a/key-1"] {
            for ctx in &contexts {
                let (key, sealed) = kms.generate_key(key_id, Some(ctx)).unwrap();
                let unsealed = kms.unseal_key(key_id, sealed.as_bytes(), Some(ctx)).unwrap();
                assert_eq!(unsealed, key);
            }
        }
    }

    #[test]
    fn other_master_key_fails_unseal() {
        let (_, sealed) = zero_kms().generate_key("default", None).unwrap();
        let other = MasterKeyKms::new("default", MasterKey::new([0x01u8; KEY_LEN]));
        assert!(other.unseal_key("default", sealed.as_bytes(), None).is_err());
    }

    #[test]
    fn wrong_length_and_tampered_blobs_fail() {
        let kms = zero_kms();
        let (_, sealed) = kms.generate_key("default", None).unwrap();
        let bytes = sealed.into_vec();

        assert!(kms.unseal_key("default", &bytes[..63], None).is_err());
        let mut longer = bytes.clone();
        longer.push(0);
        assert!(kms.unseal_key("default", &longer, None).is_err());

        let mut tampered = bytes.clone();
        tampered[HEADER_LEN + 3] ^= 0x80;
        assert!(matches!(
            kms.unseal_key("default", &tampered, None),
            Err(KmsError::Unseal)
        ));
    }

    #[test]
    fn generated_keys_are_fresh() {
        let kms = zero_kms();
        let (a, sealed_a) = kms.generate_key("default", None).unwrap();
        let (b, sealed_b) = kms.generate_key("default", None).unwrap();
        assert_ne!(a, b);
        assert_ne!(sealed_a, sealed_b);
    }

    #[test]
    fn create_key_is_unsupported() {
        let kms = zero_kms();
        for id in ["default", "new-key", ""] {
            assert!(matches!(kms.create_key(id), Err(KmsError::Unsupported(_))));
        }
    }

    #[test]
    fn info_describes_master_key_backend() {
        let info = zero_kms().info();
        assert!(info.endpoints.is_empty());
        assert_eq!(info.name, "");
        assert_eq!(info.auth_type, "master-key");
    }

    #[test]
    fn default_key_id_comes_from_constructor() {
        assert_eq!(zero_kms().default_key_id(), "default");
        let hex = "00".repeat(KEY_LEN);
        let kms = MasterKeyKms::from_config_str(&format!("minio-key:{hex}")).unwrap();
        assert_eq!(kms.default_key_id(), "minio-key");
    }

    #[test]
    fn from_config_str_derives_like_new() {
        let hex = "00".repeat(KEY_LEN);
        let parsed = MasterKeyKms::from_config_str(&format!("default:{hex}")).unwrap();
        let ctx = object_context("o1");
        let (key, sealed) = parsed.generate_key("default", Some(&ctx)).unwrap();
        let unsealed = zero_kms()
            .unseal_key("default", sealed.as_bytes(), Some(&ctx))
            .unwrap();
        assert_eq!(unsealed, key);
    }

    #[test]
    fn entropy_failure_is_fatal_and_reported() {
        let fault = Arc::new(RecordingFault::default());
        let kms = zero_kms()
            .with_entropy(Arc::new(FailingEntropy {
                ok: 0,
                calls: AtomicUsize::new(0),
            }))
            .with_fault_handler(fault.clone());

        let err = kms.generate_key("default", None).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(*fault.0.lock().unwrap(), vec![FatalError::OutOfEntropy]);
    }

    #[test]
    fn nonce_entropy_failure_is_fatal() {
        let fault = Arc::new(RecordingFault::default());
        let kms = zero_kms()
            .with_entropy(Arc::new(FailingEntropy {
                ok: 1,
                calls: AtomicUsize::new(0),
            }))
            .with_fault_handler(fault.clone());

        assert!(matches!(
            kms.generate_key("default", None),
            Err(KmsError::Fatal(FatalError::OutOfEntropy))
        ));
        assert_eq!(fault.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn unseal_failure_is_not_reported_as_fault() {
        let fault = Arc::new(RecordingFault::default());
        let kms = zero_kms().with_fault_handler(fault.clone());
        assert!(kms.unseal_key("default", &[0u8; SEALED_KEY_LEN], None).is_err());
        assert!(fault.0.lock().unwrap().is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let kms: Arc<dyn Kms> = Arc::new(zero_kms());
        std::thread::scope(|s| {
            for i in 0..8 {
                let kms = Arc::clone(&kms);
                s.spawn(move || {
                    let ctx = Context::from([("object", format!("o{i}"))]);
                    let (key, sealed) = kms.generate_key("default", Some(&ctx)).unwrap();
                    let unsealed = kms.unseal_key("default", sealed.as_bytes(), Some(&ctx)).unwrap();
                    assert_eq!(unsealed, key);
                });
            }
        });
    }

    #[test]
    fn debug_does_not_leak_master_key() {
        let out = format!("{:?}", zero_kms());
        assert!(out.contains("default"));
        assert!(out.contains("REDACTED"));
    }
}
