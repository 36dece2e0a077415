//! One-way password digest.

use sha2::{Digest, Sha256};

/// SHA-256 digest of the given text, as lowercase hex.
///
/// Deterministic and unkeyed; the store only ever holds this digest, never
/// the plaintext.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
