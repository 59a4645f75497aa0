//! Canonical encoding of the key/value context bound to every derived key.
//!
//! # Encoding
//!
//! ```text
//! {"k1":"v1","k2":"v2"}
//! ```
//!
//! Keys appear in ascending byte-wise order with no whitespace; an empty
//! context encodes as `{}`. Keys and values are written verbatim: quotes and
//! backslashes are **not** escaped, so the output is deterministic but not
//! always parseable JSON.

use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};

/// Initial capacity of the scratch buffer used for derivation input.
pub(crate) const CANONICAL_CAPACITY: usize = 128;

/// A set of key/value pairs cryptographically associated with a data key.
///
/// Backed by a [`BTreeMap`], so iteration is always in byte-wise key order
/// regardless of how the context was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, String>);

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a pair, returning the previous value for `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if any key or value contains `"` or `\`.
    ///
    /// Such contexts still encode deterministically, but two different
    /// contexts may then share one encoding.
    pub fn has_ambiguous_chars(&self) -> bool {
        self.0
            .iter()
            .any(|(k, v)| is_ambiguous(k) || is_ambiguous(v))
    }

    /// Append the canonical encoding to `dst`.
    pub fn append_to(&self, dst: &mut Vec<u8>) {
        if self.0.is_empty() {
            dst.extend_from_slice(b"{}");
            return;
        }

        // Single pair: nothing to order.
        if self.0.len() == 1 {
            if let Some((k, v)) = self.0.iter().next() {
                dst.extend_from_slice(b"{\"");
                dst.extend_from_slice(k.as_bytes());
                dst.extend_from_slice(b"\":\"");
                dst.extend_from_slice(v.as_bytes());
                dst.extend_from_slice(b"\"}");
            }
            return;
        }

        dst.push(b'{');
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                dst.push(b',');
            }
            dst.push(b'"');
            dst.extend_from_slice(k.as_bytes());
            dst.extend_from_slice(b"\":\"");
            dst.extend_from_slice(v.as_bytes());
            dst.push(b'"');
        }
        dst.push(b'}');
    }

    /// Write the canonical encoding to `w`.
    ///
    /// Returns the number of bytes written. The first write error aborts the
    /// encoding and is returned as-is.
    pub fn write_to<W: io::Write>(&self, w: &mut W) -> io::Result<usize> {
        let mut n = write_counted(w, b"{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                n += write_counted(w, b",")?;
            }
            n += write_counted(w, b"\"")?;
            n += write_counted(w, k.as_bytes())?;
            n += write_counted(w, b"\":\"")?;
            n += write_counted(w, v.as_bytes())?;
            n += write_counted(w, b"\"")?;
        }
        n += write_counted(w, b"}")?;
        Ok(n)
    }

    /// Return the canonical encoding as a new buffer.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CANONICAL_CAPACITY);
        self.append_to(&mut out);
        out
    }
}

fn is_ambiguous(s: &str) -> bool {
    s.bytes().any(|b| b == b'"' || b == b'\\')
}

fn write_counted<W: io::Write>(w: &mut W, buf: &[u8]) -> io::Result<usize> {
    w.write_all(buf)?;
    Ok(buf.len())
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Context {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Context {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
