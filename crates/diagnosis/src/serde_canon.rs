//! Canonical JSON serialization for deterministic hashing
//!
//! Provides canonical JSON serialization with:
//! - Sorted map keys for determinism
//! - No whitespace or pretty-printing
//! - Blake3 hashing for model verification

use serde::Serialize;
use std::collections::BTreeMap;

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    // First serialize to a serde_json::Value to normalize structure
    let json_value = serde_json::to_value(value)?;
    let canonical = canonicalize_value(&json_value);
    serde_json::to_string(&canonical)
}

/// Canonicalize a JSON value by sorting all object keys recursively
fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize_value(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

/// Blake3 hash of raw bytes as a hex string
pub fn hash_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Compute Blake3 hash of the canonical JSON form and return it as hex
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = to_canonical_json(value)?;
    Ok(hash_hex(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestStruct {
        b_field: i64,
        a_field: i64,
        z_field: String,
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let data = TestStruct {
            b_field: 2,
            a_field: 1,
            z_field: "test".to_string(),
        };

        let json = to_canonical_json(&data).unwrap();
        assert_eq!(json, r#"{"a_field":1,"b_field":2,"z_field":"test"}"#);
    }

    #[test]
    fn test_hash_changes_with_data() {
        let data1 = TestStruct {
            b_field: 2,
            a_field: 1,
            z_field: "test".to_string(),
        };
        let data2 = TestStruct {
            a_field: 1,
            b_field: 3,
            z_field: "test".to_string(),
        };

        let hash1 = hash_canonical_hex(&data1).unwrap();
        let hash2 = hash_canonical_hex(&data2).unwrap();

        assert_ne!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }
}
