//! Commands on an element previously returned to the caller.
//!
//! Most of these run a guarded snippet against the element via
//! `script.callFunction`. Guard failures come back as script exceptions and
//! are turned into the matching classic error before anything else.
//!
//! | Command | BiDi method |
//! |---------|-------------|
//! | tag name, text, property, attribute, css value, aria role/label | `script.callFunction` |
//! | click, clear, selected, enabled, rect, shadow root | `script.callFunction` |
//! | send keys | `script.callFunction` or `input.setFiles` |
//! | element screenshot | `browsingContext.captureScreenshot` |
//! | find child element(s) | `browsingContext.locateNodes` |

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;

use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{
    ResultOwnership, context_value, element_argument, locate_nodes, optional_str, required_str,
    script_call,
};
use super::capture::map_data_response;
use super::element::{map_find_element_response, map_find_elements_response};
use super::results::{script_value, void};
use super::snippets;
use super::validators::element_exception;
use super::values::{shadow_root_reference, to_local_value};

// ============================================================================
// Registry Entries
// ============================================================================

pub(super) const GET_TAG_NAME: CommandMapping =
    CommandMapping::new(map_tag_name_request, map_value_response);
pub(super) const GET_TEXT: CommandMapping = CommandMapping::new(map_text_request, map_value_response);
pub(super) const CLICK: CommandMapping = CommandMapping::new(map_click_request, map_void_response);
pub(super) const CLEAR: CommandMapping = CommandMapping::new(map_clear_request, map_void_response);
pub(super) const GET_PROPERTY: CommandMapping =
    CommandMapping::new(map_property_request, map_value_response);
pub(super) const GET_ATTRIBUTE: CommandMapping =
    CommandMapping::new(map_attribute_request, map_value_response);
pub(super) const IS_SELECTED: CommandMapping =
    CommandMapping::new(map_is_selected_request, map_value_response);
pub(super) const IS_ENABLED: CommandMapping =
    CommandMapping::new(map_is_enabled_request, map_value_response);
pub(super) const SEND_KEYS: CommandMapping =
    CommandMapping::new(map_send_keys_request, map_void_response);
pub(super) const GET_SHADOW_ROOT: CommandMapping =
    CommandMapping::new(map_shadow_root_request, map_shadow_root_response);
pub(super) const GET_RECT: CommandMapping = CommandMapping::new(map_rect_request, map_rect_response);
pub(super) const GET_CSS_VALUE: CommandMapping =
    CommandMapping::new(map_css_value_request, map_value_response);
pub(super) const GET_ARIA_ROLE: CommandMapping =
    CommandMapping::new(map_aria_role_request, map_value_response);
pub(super) const GET_ARIA_LABEL: CommandMapping =
    CommandMapping::new(map_aria_label_request, map_value_response);
pub(super) const ELEMENT_SCREENSHOT: CommandMapping =
    CommandMapping::new(map_screenshot_request, map_data_response);
pub(super) const FIND_CHILD_ELEMENT: CommandMapping =
    CommandMapping::new(map_find_child_request, map_find_element_response);
pub(super) const FIND_CHILD_ELEMENTS: CommandMapping =
    CommandMapping::new(map_find_children_request, map_find_elements_response);

// ============================================================================
// Request Mappers
// ============================================================================

/// Calls `snippet(element, ...extra)` on the element in `params.id`.
fn call_on_element(
    params: &Value,
    context: Option<&ContextId>,
    snippet: &str,
    extra: &[&str],
    ownership: ResultOwnership,
) -> Result<ProtocolRequest> {
    let mut arguments = vec![element_argument(params)?];
    for key in extra {
        arguments.push(to_local_value(&Value::from(required_str(params, key)?)));
    }
    Ok(script_call(context, snippet, arguments, ownership))
}

fn map_tag_name_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_TAG_NAME, &[], ResultOwnership::None)
}

fn map_text_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_TEXT, &[], ResultOwnership::None)
}

fn map_click_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::CLICK, &[], ResultOwnership::None)
}

fn map_clear_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::CLEAR, &[], ResultOwnership::None)
}

fn map_property_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_PROPERTY, &["name"], ResultOwnership::None)
}

fn map_attribute_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_ATTRIBUTE, &["name"], ResultOwnership::None)
}

fn map_is_selected_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::IS_SELECTED, &[], ResultOwnership::None)
}

fn map_is_enabled_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::IS_ENABLED, &[], ResultOwnership::None)
}

fn map_shadow_root_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_SHADOW_ROOT, &[], ResultOwnership::Root)
}

fn map_rect_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_RECT, &[], ResultOwnership::None)
}

fn map_css_value_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(
        params,
        context,
        snippets::GET_CSS_VALUE,
        &["propertyName"],
        ResultOwnership::None,
    )
}

fn map_aria_role_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_ARIA_ROLE, &[], ResultOwnership::None)
}

fn map_aria_label_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    call_on_element(params, context, snippets::GET_ARIA_LABEL, &[], ResultOwnership::None)
}

/// Paths to upload when every line of `text` names an existing file.
fn file_paths(text: &str) -> Option<Vec<&str>> {
    let lines: Vec<&str> = text.split('\n').collect();
    lines
        .iter()
        .all(|line| !line.is_empty() && Path::new(line).is_file())
        .then_some(lines)
}

/// Typing into a file input with local file paths sets the files instead.
fn map_send_keys_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    let text = optional_str(params, "text").unwrap_or_default();

    if let Some(files) = file_paths(text) {
        return Ok(ProtocolRequest::new(
            "input.setFiles",
            json!({
                "context": context_value(context),
                "element": element_argument(params)?,
                "files": files,
            }),
        ));
    }

    let element = element_argument(params)?;
    Ok(script_call(
        context,
        snippets::SEND_KEYS,
        vec![element, to_local_value(&Value::from(text))],
        ResultOwnership::None,
    ))
}

fn map_screenshot_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::new(
        "browsingContext.captureScreenshot",
        json!({
            "context": context_value(context),
            "clip": { "type": "element", "element": element_argument(params)? },
        }),
    ))
}

fn map_find_child_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    locate_nodes(context, params, true, Some(element_argument(params)?))
}

fn map_find_children_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    locate_nodes(context, params, false, Some(element_argument(params)?))
}

// ============================================================================
// Response Mappers
// ============================================================================

fn map_value_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    if let Some(error) = element_exception(result) {
        return Ok(error);
    }
    Ok(ClassicResponse::value(script_value(result)))
}

fn map_void_response(result: &Value, params: &Value) -> Result<ClassicResponse> {
    match element_exception(result) {
        Some(error) => Ok(error),
        None => void(result, params),
    }
}

fn map_shadow_root_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    if let Some(error) = element_exception(result) {
        return Ok(error);
    }

    let shared_id = result
        .get("result")
        .and_then(|remote| remote.get("sharedId"))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::protocol("no sharedId in shadow root node"))?;
    Ok(ClassicResponse::value(shadow_root_reference(shared_id)))
}

fn map_rect_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    if let Some(error) = element_exception(result) {
        return Ok(error);
    }

    let rect = script_value(result);
    let dimension = |key: &str| rect.get(key).cloned().unwrap_or_else(|| json!(0));
    Ok(ClassicResponse::value(json!({
        "x": dimension("x"),
        "y": dimension("y"),
        "width": dimension("width"),
        "height": dimension("height"),
    })))
}

// ============================================================================
// Tests
// ============================================================================
