// manuplan-core/src/hashing.rs
// ============================================================================
// Module: Canonical JSON & Hashing
// Description: RFC 8785 canonicalization and SHA-256 digests for identifiers.
// Purpose: Give every content-addressed id in the core a single, shared
//          canonicalization path so hashes are stable across hosts.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! `Decision.id`, `Step.step_id`, `report_hash`, and `content_hash` are all
//! SHA-256 digests over the canonical JSON encoding of some subset of a
//! struct's fields. Canonical JSON here means RFC 8785 JSON Canonicalization
//! Scheme: sorted object keys, no insignificant whitespace, UTF-8, and
//! numbers in their shortest round-trip form. All hashing inputs must pass
//! through [`canonical_json_bytes`] so that two hosts given the same logical
//! value always agree on the digest.

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// Hash algorithms usable for content-addressed identifiers.
///
/// Only SHA-256 is supported today; the enum exists so the contract can
/// grow without changing the shape of [`HashDigest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256, the only supported algorithm.
    Sha256,
}

/// The algorithm used when none is specified explicitly.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

/// Number of leading hex characters retained in a [`crate::identifiers::DecisionId`].
///
/// The specification requires a single fixed length across the external
/// contract; this implementation fixes it at 16 hex characters (64 bits of
/// the underlying digest), which keeps ids short while leaving collision
/// probability far below the scale of any single manufacturing program.
pub const DECISION_ID_HEX_LEN: usize = 16;

/// Errors produced while canonicalizing or hashing a value.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Serialization into canonical JSON failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
}

/// Serializes `value` into RFC 8785 canonical JSON bytes.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when `value` cannot be
/// serialized (for example, it contains a non-finite float or a map with
/// non-string keys that `serde_json` itself would reject).
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Serializes and hashes `value`, returning the full hex digest.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when canonicalization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<String, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes, returning the full hex digest.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            hex_encode(&hasher.finalize())
        }
    }
}

/// Truncates a full hex digest to [`DECISION_ID_HEX_LEN`] characters.
///
/// Truncation happens on the hex string rather than the raw digest so the
/// result is always stable regardless of how many bytes the full digest
/// contains.
#[must_use]
pub fn truncate_hex(full_hex: &str, len: usize) -> String {
    full_hex.chars().take(len).collect()
}

/// A labeled digest value, retained for call sites that want to carry the
/// algorithm alongside the hex string (for example, provenance records).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashDigest {
    /// Algorithm used to produce [`Self::hex`].
    pub algorithm: HashAlgorithm,
    /// Lowercase hex encoding of the digest.
    pub hex: String,
}

impl HashDigest {
    /// Hashes the canonical JSON of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when canonicalization fails.
    pub fn of_canonical_json<T: Serialize + ?Sized>(
        algorithm: HashAlgorithm,
        value: &T,
    ) -> Result<Self, HashError> {
        let hex = hash_canonical_json(algorithm, value)?;
        Ok(Self { algorithm, hex })
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // `write!` into a `String` cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_keys() {
        let value = json!({"b": 1, "a": 2});
        let bytes = canonical_json_bytes(&value).expect("canonicalizes");
        assert_eq!(bytes, br#"{"a":2,"b":1}"#);
    }

    #[test]
    fn same_logical_value_hashes_identically_regardless_of_field_order() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 2, "x": 1});
        let ha = hash_canonical_json(HashAlgorithm::Sha256, &a).expect("hashes");
        let hb = hash_canonical_json(HashAlgorithm::Sha256, &b).expect("hashes");
        assert_eq!(ha, hb);
    }

    #[test]
    fn truncate_hex_is_prefix_of_full_digest() {
        let full = hash_canonical_json(HashAlgorithm::Sha256, &json!({"k": "v"})).expect("hashes");
        let short = truncate_hex(&full, DECISION_ID_HEX_LEN);
        assert_eq!(short.len(), DECISION_ID_HEX_LEN);
        assert!(full.starts_with(&short));
    }
}
