//! Element lookup from the document root: `findElement`, `findElements`.

use serde_json::Value;

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{is_link_text, locate_nodes, optional_str};
use super::results::field;
use super::validators::no_such_element;
use super::values::element_reference;

pub(super) const FIND_ELEMENT: CommandMapping =
    CommandMapping::new(map_find_element_request, map_find_element_response);
pub(super) const FIND_ELEMENTS: CommandMapping =
    CommandMapping::new(map_find_elements_request, map_find_elements_response);

fn map_find_element_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    locate_nodes(context, params, true, None)
}

fn map_find_elements_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    locate_nodes(context, params, false, None)
}

fn nodes(result: &Value) -> Result<&[Value]> {
    Ok(field(result, "nodes")?
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default())
}

fn shared_id(node: &Value) -> &str {
    node.get("sharedId").and_then(Value::as_str).unwrap_or_default()
}

fn is_anchor(node: &Value) -> bool {
    node.get("value")
        .and_then(|value| value.get("localName"))
        .and_then(Value::as_str)
        .is_some_and(|name| name.eq_ignore_ascii_case("a"))
}

/// Located nodes in document order; link text lookups keep anchors only.
fn located<'a>(result: &'a Value, params: &Value) -> Result<Vec<&'a Value>> {
    let anchors_only = optional_str(params, "using").is_some_and(is_link_text);
    Ok(nodes(result)?
        .iter()
        .filter(|node| !anchors_only || is_anchor(node))
        .collect())
}

/// First located node as an element reference, or `no such element`.
pub(super) fn map_find_element_response(result: &Value, params: &Value) -> Result<ClassicResponse> {
    let response = match located(result, params)?.first() {
        Some(node) => ClassicResponse::value(element_reference(shared_id(node))),
        None => no_such_element(params),
    };
    Ok(response)
}

/// All located nodes as element references; an empty list is not an error.
pub(super) fn map_find_elements_response(result: &Value, params: &Value) -> Result<ClassicResponse> {
    let references: Vec<Value> = located(result, params)?
        .into_iter()
        .map(|node| element_reference(shared_id(node)))
        .collect();
    Ok(ClassicResponse::value(Value::Array(references)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::ErrorCode;

    fn node(shared_id: &str, local_name: &str) -> Value {
        json!({
            "type": "node",
            "sharedId": shared_id,
            "value": {"nodeType": 1, "localName": local_name},
        })
    }

    fn located_nodes() -> Value {
        json!({"nodes": [node("div-1", "div"), node("a-1", "a"), node("a-2", "A")]})
    }

    #[test]
    fn test_link_text_skips_containers() {
        let params = json!({"using": "partial link text", "value": "More"});

        let single = map_find_element_response(&located_nodes(), &params).expect("response");
        assert_eq!(single.success_value(), Some(&element_reference("a-1")));

        let all = map_find_elements_response(&located_nodes(), &params).expect("response");
        assert_eq!(
            all.success_value(),
            Some(&json!([element_reference("a-1"), element_reference("a-2")]))
        );
    }

    #[test]
    fn test_link_text_without_anchor_is_no_such_element() {
        let params = json!({"using": "link text", "value": "More"});
        let result = json!({"nodes": [node("div-1", "div")]});

        let response = map_find_element_response(&result, &params).expect("response");
        assert_eq!(
            response.as_error().map(|error| error.code),
            Some(ErrorCode::NoSuchElement)
        );
    }

    #[test]
    fn test_css_lookup_keeps_every_node() {
        let params = json!({"using": "css selector", "value": ".item"});

        let single = map_find_element_response(&located_nodes(), &params).expect("response");
        assert_eq!(single.success_value(), Some(&element_reference("div-1")));

        let all = map_find_elements_response(&located_nodes(), &params).expect("response");
        assert_eq!(all.success_value().and_then(Value::as_array).map(Vec::len), Some(3));
    }
}
