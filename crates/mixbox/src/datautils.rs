//! Helpers for working with dictionary (JSON) data

use serde_json::{Map, Value};

use crate::error::EntityError;

/// Whether `value` is a container: arrays and objects are, strings and
/// other scalars are not.
pub fn is_sequence(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Whether `value` counts as empty input for dictionary parsing.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Check that every key in `keys` is present in `map`.
///
/// # Errors
///
/// `MissingKeys` naming the absent keys, in the order given.
pub fn require_keys(map: &Map<String, Value>, keys: &[&str]) -> Result<(), EntityError> {
    let missing: Vec<String> = keys
        .iter()
        .filter(|k| !map.contains_key(**k))
        .map(|k| k.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EntityError::MissingKeys(missing))
    }
}
