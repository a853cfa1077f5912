//! Window commands: handles, close and screen orientation.

use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{context_value, get_tree, optional_str, required_str, script_evaluate};
use super::navigation::map_current_context_request;
use super::results::{contexts, first_context, script_value, void};
use super::snippets;
use super::validators::javascript_error;

pub(super) const GET_WINDOW_HANDLES: CommandMapping =
    CommandMapping::new(map_window_handles_request, map_window_handles_response);
pub(super) const GET_CURRENT_WINDOW_HANDLE: CommandMapping =
    CommandMapping::new(map_current_context_request, map_current_window_handle_response);
pub(super) const CLOSE: CommandMapping = CommandMapping::new(map_close_request, void);
pub(super) const GET_SCREEN_ORIENTATION: CommandMapping =
    CommandMapping::new(map_get_orientation_request, map_get_orientation_response);
pub(super) const SET_SCREEN_ORIENTATION: CommandMapping =
    CommandMapping::new(map_set_orientation_request, map_set_orientation_response);

fn map_window_handles_request(_params: &Value, _context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(get_tree(None))
}

fn map_window_handles_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    let handles: Vec<Value> = contexts(result)?
        .iter()
        .filter_map(|ctx| ctx.get("context").cloned())
        .collect();
    Ok(ClassicResponse::value(Value::Array(handles)))
}

fn map_current_window_handle_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    let handle = first_context(result)?.get("context").cloned().unwrap_or(Value::Null);
    Ok(ClassicResponse::value(handle))
}

fn map_close_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    let target = optional_str(params, "handle")
        .map(Value::from)
        .unwrap_or_else(|| context_value(context));
    Ok(ProtocolRequest::new("browsingContext.close", json!({ "context": target })))
}

fn map_get_orientation_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(script_evaluate(context, snippets::GET_ORIENTATION))
}

fn map_get_orientation_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    if let Some(error) = javascript_error(result) {
        return Ok(error);
    }

    let kind = script_value(result);
    let orientation = match kind.as_str() {
        Some(kind) if kind.contains("portrait") => "PORTRAIT",
        _ => "LANDSCAPE",
    };
    Ok(ClassicResponse::value(json!({ "orientation": orientation })))
}

fn map_set_orientation_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    let orientation = required_str(params, "orientation")?;
    Ok(script_evaluate(context, &snippets::set_orientation(orientation)))
}

fn map_set_orientation_response(result: &Value, params: &Value) -> Result<ClassicResponse> {
    match javascript_error(result) {
        Some(error) => Ok(error),
        None => void(result, params),
    }
}
