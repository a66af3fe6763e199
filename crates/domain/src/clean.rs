//! Clean-before-transmit serialization filter.
//!
//! Rule: an attribute whose value is unset is omitted from the wire payload
//! instead of being sent as `null`. A nested relation whose `id` is the
//! empty marker (`""` or `-1`) counts as unset.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Whether a top-level attribute value is unset.
pub fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => match map.get("id") {
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Number(n)) => n.as_i64() == Some(-1),
            Some(Value::Null) => true,
            _ => false,
        },
        _ => false,
    }
}

/// Drop unset attributes from an already-serialized entity.
///
/// Non-object values pass through untouched.
pub fn clean_value(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.retain(|_, v| !is_unset(v));
            Value::Object(map)
        }
        other => other,
    }
}

/// Serialize an entity into its cleaned wire payload.
pub fn clean_entity<E: Serialize>(entity: &E) -> Result<Value> {
    Ok(clean_value(serde_json::to_value(entity)?))
}
