//! Deterministic fingerprinting of request content.

use sha2::{Digest, Sha256};

/// Compute the cache key for a `(prompt, input)` pair.
///
/// SHA-256 over the concatenated pair, hex-encoded. Pure and deterministic:
/// identical pairs always yield the identical fingerprint, across calls and
/// across process restarts. A length prefix separates the two fields so that
/// `("ab", "c")` and `("a", "bc")` cannot collide.
pub fn fingerprint(prompt: &str, input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((prompt.len() as u64).to_be_bytes());
    hasher.update(prompt.as_bytes());
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
