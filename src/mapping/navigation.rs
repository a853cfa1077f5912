//! Navigation commands: `get`, `getCurrentUrl`, `refresh`, `goBack`, `goForward`, `getTitle`.

use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{context_value, get_tree, required_str, script_evaluate};
use super::results::{first_context, script_value, void};
use super::snippets;
use super::validators::javascript_error;

pub(super) const GET: CommandMapping = CommandMapping::new(map_get_request, void);
pub(super) const GET_CURRENT_URL: CommandMapping =
    CommandMapping::new(map_current_context_request, map_current_url_response);
pub(super) const REFRESH: CommandMapping = CommandMapping::new(map_refresh_request, void);
pub(super) const GO_BACK: CommandMapping = CommandMapping::new(map_go_back_request, void);
pub(super) const GO_FORWARD: CommandMapping = CommandMapping::new(map_go_forward_request, void);
pub(super) const GET_TITLE: CommandMapping =
    CommandMapping::new(map_title_request, map_script_primitive_response);

fn map_get_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::new(
        "browsingContext.navigate",
        json!({
            "context": context_value(context),
            "url": required_str(params, "url")?,
            "wait": "interactive",
        }),
    ))
}

/// `getTree` limited to the current context; shared with the window handle command.
pub(super) fn map_current_context_request(
    _params: &Value,
    context: Option<&ContextId>,
) -> Result<ProtocolRequest> {
    Ok(get_tree(context.map(ContextId::as_str)))
}

fn map_current_url_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    let url = first_context(result)?.get("url").cloned().unwrap_or(Value::Null);
    Ok(ClassicResponse::value(url))
}

fn map_refresh_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::new(
        "browsingContext.reload",
        json!({
            "context": context_value(context),
            "ignoreCache": true,
            "wait": "interactive",
        }),
    ))
}

fn traverse_history(context: Option<&ContextId>, delta: i64) -> ProtocolRequest {
    ProtocolRequest::new(
        "browsingContext.traverseHistory",
        json!({ "context": context_value(context), "delta": delta }),
    )
}

fn map_go_back_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(traverse_history(context, -1))
}

fn map_go_forward_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(traverse_history(context, 1))
}

fn map_title_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(script_evaluate(context, snippets::GET_TITLE))
}

/// Script result that must be a primitive; script exceptions become `javascript error`.
pub(super) fn map_script_primitive_response(
    result: &Value,
    _params: &Value,
) -> Result<ClassicResponse> {
    if let Some(error) = javascript_error(result) {
        return Ok(error);
    }
    Ok(ClassicResponse::value(script_value(result)))
}
