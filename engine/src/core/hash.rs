//! Canonical content hashing
//!
//! Used to pin a meter snapshot to the tariff it was recorded under and to
//! fingerprint receipts so a fare recomputed from recorded inputs can be
//! checked against the original.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::error::PricingError;

/// Compute a deterministic SHA256 hex digest of any serializable value
///
/// Object keys are sorted recursively before hashing so the digest does not
/// depend on field or map iteration order.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String, PricingError> {
    let value = serde_json::to_value(value)
        .map_err(|e| PricingError::Serialization(format!("hash input: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| PricingError::Serialization(format!("hash input: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
