//! Response envelope handling.
//!
//! Success bodies arrive either bare (`[...]`) or nested under a named key
//! (`{"pins": [...]}`). Services name the key they expect and accept both.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// Decode `value[key]` when it is present and non-null, else `value` itself.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the chosen payload does not match `T`.
pub fn unwrap_envelope<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, ClientError> {
    let payload = match value {
        Value::Object(mut map) if map.get(key).is_some_and(|v| !v.is_null()) => {
            map.remove(key).unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(payload).map_err(|e| ClientError::Decode(format!("{key}: {e}")))
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
