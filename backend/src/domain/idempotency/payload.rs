//! Request body fingerprints for idempotent creations.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::Error;

/// SHA-256 of a request body in canonical JSON form.
///
/// Two bodies that differ only in key order or whitespace share a hash, so a
/// retry is recognised while a different body under the same key is not.
///
/// # Example
///
/// ```
/// # use staffing::domain::idempotency::PayloadHash;
/// # use serde_json::json;
/// let a = PayloadHash::of(&json!({"role": "Lead", "employeeId": 7})).expect("hash");
/// let b = PayloadHash::of(&json!({"employeeId": 7, "role": "Lead"})).expect("hash");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadHash([u8; 32]);

impl PayloadHash {
    /// Fingerprint a serialisable request body.
    ///
    /// # Errors
    /// Returns an internal error when the body cannot be encoded as JSON.
    pub fn of<T: Serialize + ?Sized>(payload: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(payload)
            .map_err(|err| Error::internal(format!("failed to encode request body: {err}")))?;
        let bytes = serde_json::to_vec(&canonicalize(value))
            .map_err(|err| Error::internal(format!("failed to encode request body: {err}")))?;
        Ok(Self(Sha256::digest(&bytes).into()))
    }

    /// Lowercase hexadecimal form, for logs.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Sort object keys recursively; arrays keep their order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.cmp(right));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, nested)| (key, canonicalize(nested)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
