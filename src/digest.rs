//! Content digests for identity and change detection.
//!
//! Everything the store identifies by content (node payloads, job inputs,
//! the resolved-plugins hash, page-data results) hashes through here so the
//! digest format stays uniform: hex-encoded SHA-256.

use miette::Diagnostic;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::ContentDigest;

/// Error produced while computing a digest over a serializable value.
#[derive(Debug, Error, Diagnostic)]
pub enum DigestError {
    /// The value could not be encoded as JSON for hashing.
    #[error("failed to serialize value for digesting: {source}")]
    #[diagnostic(
        code(siteloom::digest::serialize),
        help("The value must serialize cleanly with serde_json (no non-string map keys).")
    )]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Computes the digest of raw bytes.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::digest::content_digest_of_bytes;
///
/// let digest = content_digest_of_bytes(b"hello");
/// assert_eq!(digest.len(), 64);
/// assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn content_digest_of_bytes(bytes: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Computes the digest of any serializable value via its canonical JSON
/// encoding.
///
/// Determinism follows from the serialization: struct fields hash in
/// declaration order and `serde_json::Value` objects in insertion order.
/// Callers hashing hand-built maps should sort keys first when a stable
/// digest matters.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::digest::content_digest_of;
/// use serde_json::json;
///
/// let a = content_digest_of(&json!({"width": 400})).unwrap();
/// let b = content_digest_of(&json!({"width": 400})).unwrap();
/// let c = content_digest_of(&json!({"width": 800})).unwrap();
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
pub fn content_digest_of<T: Serialize>(value: &T) -> Result<ContentDigest, DigestError> {
    let encoded =
        serde_json::to_vec(value).map_err(|source| DigestError::Serialize { source })?;
    Ok(content_digest_of_bytes(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_digest_is_stable() {
        assert_eq!(
            content_digest_of_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_value_digest_tracks_content() {
        let a = content_digest_of(&"markdown body").unwrap();
        let b = content_digest_of(&"markdown body").unwrap();
        let c = content_digest_of(&"markdown body, edited").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
