//! Parameter extraction and BiDi request builders shared by mappers.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::identifiers::ContextId;
use crate::protocol::ProtocolRequest;

use super::values::{shared_reference, to_local_value};

// ============================================================================
// Parameter Access
// ============================================================================

/// Returns a required string parameter.
pub fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument(format!("missing string parameter '{key}'")))
}

/// Returns an optional string parameter.
#[inline]
pub fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Returns the browsing context as JSON (`null` when unknown).
#[inline]
pub fn context_value(context: Option<&ContextId>) -> Value {
    context.map_or(Value::Null, |ctx| Value::String(ctx.as_str().to_string()))
}

/// `{sharedId}` of the element addressed by `params.id`.
pub fn element_argument(params: &Value) -> Result<Value> {
    required_str(params, "id").map(shared_reference)
}

/// `{sharedId}` of the shadow root addressed by `params.shadowId`.
pub fn shadow_root_argument(params: &Value) -> Result<Value> {
    required_str(params, "shadowId").map(shared_reference)
}

/// Converts `params.args` into BiDi local values.
pub fn script_arguments(params: &Value) -> Vec<Value> {
    params
        .get("args")
        .and_then(Value::as_array)
        .map(|args| args.iter().map(to_local_value).collect())
        .unwrap_or_default()
}

// ============================================================================
// Request Builders
// ============================================================================

/// Ownership of objects returned by a script call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOwnership {
    /// Return values are not kept alive.
    None,
    /// Return values stay reachable by handle (needed for shadow roots).
    Root,
}

impl ResultOwnership {
    const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Root => "root",
        }
    }
}

/// `script.evaluate` of an expression in the context.
pub fn script_evaluate(context: Option<&ContextId>, expression: &str) -> ProtocolRequest {
    ProtocolRequest::new(
        "script.evaluate",
        json!({
            "expression": expression,
            "target": { "context": context_value(context) },
            "awaitPromise": true,
            "resultOwnership": "none",
        }),
    )
}

/// `script.callFunction` of a function declaration with BiDi arguments.
pub fn script_call(
    context: Option<&ContextId>,
    function: &str,
    arguments: Vec<Value>,
    ownership: ResultOwnership,
) -> ProtocolRequest {
    ProtocolRequest::new(
        "script.callFunction",
        json!({
            "functionDeclaration": function,
            "arguments": arguments,
            "target": { "context": context_value(context) },
            "awaitPromise": true,
            "resultOwnership": ownership.as_str(),
        }),
    )
}

/// `browsingContext.getTree` rooted at `root` (all top-level contexts when `None`).
pub fn get_tree(root: Option<&str>) -> ProtocolRequest {
    let params = match root {
        Some(root) => json!({ "root": root, "maxDepth": 0 }),
        None => json!({}),
    };
    ProtocolRequest::new("browsingContext.getTree", params)
}

/// Translates a classic locator strategy into a BiDi locator.
pub fn locator(using: &str, value: &str) -> Value {
    match using {
        "css selector" => json!({ "type": "css", "value": value }),
        "xpath" => json!({ "type": "xpath", "value": value }),
        "id" => json!({ "type": "css", "value": format!("[id=\"{}\"]", css_escape(value)) }),
        "name" => json!({ "type": "css", "value": format!("[name=\"{}\"]", css_escape(value)) }),
        "class name" => json!({ "type": "css", "value": format!(".{value}") }),
        "tag name" => json!({ "type": "css", "value": value }),
        "link text" => json!({
            "type": "innerText",
            "value": value,
            "matchType": "full",
        }),
        "partial link text" => json!({
            "type": "innerText",
            "value": value,
            "matchType": "partial",
        }),
        other => json!({ "type": other, "value": value }),
    }
}

/// Link text strategies match on rendered text and must be narrowed to anchors.
#[must_use]
pub fn is_link_text(using: &str) -> bool {
    matches!(using, "link text" | "partial link text")
}

fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `browsingContext.locateNodes` for a classic `{using, value}` search.
pub fn locate_nodes(
    context: Option<&ContextId>,
    params: &Value,
    single: bool,
    start_node: Option<Value>,
) -> Result<ProtocolRequest> {
    let using = required_str(params, "using")?;
    let value = required_str(params, "value")?;

    let mut bidi = Map::new();
    bidi.insert("context".into(), context_value(context));
    bidi.insert("locator".into(), locator(using, value));
    // Link text candidates are filtered to anchors afterwards, so the
    // first match is not necessarily the answer.
    if single && !is_link_text(using) {
        bidi.insert("maxNodeCount".into(), json!(1));
    }
    if let Some(node) = start_node {
        bidi.insert("startNodes".into(), json!([node]));
    }

    Ok(ProtocolRequest::new(
        "browsingContext.locateNodes",
        Value::Object(bidi),
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_str_missing() {
        let err = required_str(&json!({}), "url").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_locator_strategies() {
        assert_eq!(locator("css selector", "#a"), json!({"type": "css", "value": "#a"}));
        assert_eq!(locator("id", "main"), json!({"type": "css", "value": "[id=\"main\"]"}));
        assert_eq!(locator("class name", "btn"), json!({"type": "css", "value": ".btn"}));
        assert_eq!(
            locator("partial link text", "More"),
            json!({"type": "innerText", "value": "More", "matchType": "partial"})
        );
    }

    #[test]
    fn test_link_text_lookup_is_not_capped() {
        let request = locate_nodes(
            None,
            &json!({"using": "partial link text", "value": "More"}),
            true,
            None,
        )
        .expect("request");
        assert!(request.params.get("maxNodeCount").is_none());

        let request = locate_nodes(None, &json!({"using": "tag name", "value": "a"}), true, None)
            .expect("request");
        assert_eq!(request.params["maxNodeCount"], 1);
    }

    #[test]
    fn test_locate_nodes_shape() {
        let ctx = ContextId::new("c1");
        let request = locate_nodes(
            Some(&ctx),
            &json!({"using": "xpath", "value": "//a"}),
            true,
            Some(shared_reference("root")),
        )
        .expect("request");

        assert_eq!(request.method, "browsingContext.locateNodes");
        assert_eq!(
            request.params,
            json!({
                "context": "c1",
                "locator": {"type": "xpath", "value": "//a"},
                "maxNodeCount": 1,
                "startNodes": [{"sharedId": "root"}]
            })
        );
    }

    #[test]
    fn test_script_call_without_context() {
        let request = script_call(None, "function() {}", vec![], ResultOwnership::Root);
        assert_eq!(request.params["target"], json!({"context": null}));
        assert_eq!(request.params["resultOwnership"], "root");
    }
}
