//! Helpers for reading BiDi results inside response mappers.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::ClassicResponse;

use super::values::from_remote_value;

// ============================================================================
// Responses
// ============================================================================

/// Response mapper for commands whose classic result is `null`.
pub fn void(_result: &Value, _params: &Value) -> Result<ClassicResponse> {
    Ok(ClassicResponse::void())
}

/// `result.result` of a script call, converted to classic JSON.
#[must_use]
pub fn script_value(result: &Value) -> Value {
    result.get("result").map(from_remote_value).unwrap_or(Value::Null)
}

// ============================================================================
// Field Access
// ============================================================================

/// Returns a field of the BiDi result or a protocol error naming it.
pub fn field<'a>(result: &'a Value, key: &str) -> Result<&'a Value> {
    result
        .get(key)
        .ok_or_else(|| Error::protocol(format!("BiDi result is missing '{key}'")))
}

/// Returns a string field of the BiDi result.
pub fn str_field<'a>(result: &'a Value, key: &str) -> Result<&'a str> {
    field(result, key)?
        .as_str()
        .ok_or_else(|| Error::protocol(format!("BiDi result field '{key}' is not a string")))
}

/// Returns the `contexts` list of a `browsingContext.getTree` result.
pub fn contexts(result: &Value) -> Result<&[Value]> {
    field(result, "contexts")?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::protocol("BiDi result field 'contexts' is not a list"))
}

/// Returns the first context of a `browsingContext.getTree` result.
pub fn first_context(result: &Value) -> Result<&Value> {
    contexts(result)?
        .first()
        .ok_or_else(|| Error::protocol("browsingContext.getTree returned no contexts"))
}

// ============================================================================
// Tests
// ============================================================================
