//! HMAC-SHA256 derivation of per-key-ID, per-context subkeys.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::context::{Context, CANONICAL_CAPACITY};
use crate::keys::{DerivedKey, MasterKey, KEY_LEN};

type HmacSha256 = Hmac<Sha256>;

/// Derive the subkey for `key_id` and `context` from `master`.
///
/// Computes `HMAC-SHA256(master, key_id || canonical(context))` with no
/// separator between the two parts. A missing context derives exactly like
/// an empty one.
pub fn derive_key(master: &MasterKey, key_id: &str, context: Option<&Context>) -> DerivedKey {
    let empty = Context::new();
    let context = context.unwrap_or(&empty);
    if context.has_ambiguous_chars() {
        warn!(key_id, "context contains unescaped quote or backslash; its encoding may collide");
    }

    let mut canonical = Vec::with_capacity(CANONICAL_CAPACITY);
    context.append_to(&mut canonical);

    let mut mac = HmacSha256::new_from_slice(master.as_bytes())
        .expect("HMAC can take a key of any size");
    mac.update(key_id.as_bytes());
    mac.update(&canonical);

    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    DerivedKey::from_bytes(out)
}
