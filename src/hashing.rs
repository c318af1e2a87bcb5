//! Hashing - Folder Fingerprints
//!
//! A fingerprint is the SHA-256 of a folder's canonical JSON. Two folders with
//! the same derived state always produce the same fingerprint.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::folder::UploadedFolder;

/// Compute SHA-256 hash of bytes, return lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// JSON with object keys sorted at every depth, no whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_string(&canonicalize(value))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Fingerprint of a folder's validated state.
///
/// Selection is a UI concern and is left out.
pub fn folder_fingerprint(folder: &UploadedFolder) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(folder)?;
    if let Value::Object(map) = &mut value {
        map.remove("selected");
    }
    Ok(sha256_hex(canonical_json(&value)?.as_bytes()))
}
