//! Conversion between classic JSON values and BiDi script values.
//!
//! Classic callers pass script arguments as plain JSON where elements and
//! shadow roots are objects keyed by [`ELEMENT_KEY`] / [`SHADOW_ROOT_KEY`].
//! BiDi wants typed `LocalValue`s in and returns typed `RemoteValue`s out.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value, json};

// ============================================================================
// Constants
// ============================================================================

/// Key identifying a web element reference in classic JSON.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Key identifying a shadow root reference in classic JSON.
pub const SHADOW_ROOT_KEY: &str = "shadow-6066-11e4-a52e-4f735466cecf";

// ============================================================================
// Reference Builders
// ============================================================================

/// BiDi shared reference to a node.
#[inline]
#[must_use]
pub fn shared_reference(shared_id: &str) -> Value {
    json!({ "sharedId": shared_id })
}

/// Classic web element reference.
#[inline]
#[must_use]
pub fn element_reference(shared_id: &str) -> Value {
    json!({ ELEMENT_KEY: shared_id })
}

/// Classic shadow root reference.
#[inline]
#[must_use]
pub fn shadow_root_reference(shared_id: &str) -> Value {
    json!({ SHADOW_ROOT_KEY: shared_id })
}

// ============================================================================
// Classic -> BiDi
// ============================================================================

/// Converts a classic script argument into a BiDi `LocalValue`.
///
/// Element and shadow root references become shared references; objects
/// become `[key, value]` pair lists.
#[must_use]
pub fn to_local_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "type": "null" }),
        Value::Bool(b) => json!({ "type": "boolean", "value": b }),
        Value::Number(n) => json!({ "type": "number", "value": n }),
        Value::String(s) => json!({ "type": "string", "value": s }),
        Value::Array(items) => json!({
            "type": "array",
            "value": items.iter().map(to_local_value).collect::<Vec<_>>(),
        }),
        Value::Object(map) => {
            if let Some(id) = map.get(ELEMENT_KEY).or_else(|| map.get(SHADOW_ROOT_KEY)) {
                return json!({ "sharedId": id });
            }

            let pairs: Vec<Value> = map
                .iter()
                .map(|(key, value)| json!([{ "type": "string", "value": key }, to_local_value(value)]))
                .collect();
            json!({ "type": "object", "value": pairs })
        }
    }
}

// ============================================================================
// BiDi -> Classic
// ============================================================================

/// Converts a BiDi `RemoteValue` into classic JSON.
///
/// Nodes become element references, windows become their context id,
/// unsupported types (functions, promises, symbols...) become `null`.
#[must_use]
pub fn from_remote_value(value: &Value) -> Value {
    let Some(object) = value.as_object() else {
        return value.clone();
    };

    match object.get("type").and_then(Value::as_str) {
        Some("string" | "number" | "boolean") => object.get("value").cloned().unwrap_or(Value::Null),
        Some("window") => object
            .get("value")
            .and_then(|v| v.get("context"))
            .cloned()
            .unwrap_or(Value::Null),
        Some("node") => {
            let shared_id = object
                .get("sharedId")
                .or_else(|| object.get("value").and_then(|v| v.get("sharedId")))
                .cloned()
                .unwrap_or(Value::Null);
            json!({ ELEMENT_KEY: shared_id })
        }
        Some("array") => Value::Array(
            object
                .get("value")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(from_remote_value).collect())
                .unwrap_or_default(),
        ),
        Some("object") => {
            let mut result = Map::new();
            let pairs = object.get("value").and_then(Value::as_array);
            for pair in pairs.into_iter().flatten() {
                let (Some(key), Some(item)) = (pair.get(0), pair.get(1)) else {
                    continue;
                };
                let key = match from_remote_value(key) {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                result.insert(key, from_remote_value(item));
            }
            Value::Object(result)
        }
        _ => Value::Null,
    }
}

// ============================================================================
// Tests
// ============================================================================
