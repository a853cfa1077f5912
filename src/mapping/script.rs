//! User script execution: `w3cExecuteScript` and `w3cExecuteScriptAsync`.
//!
//! Classic scripts are function bodies taking their arguments through
//! `arguments`. They run through `script.callFunction` with the converted
//! arguments; the async flavour appends a completion callback.

use serde_json::Value;

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{ResultOwnership, optional_str, script_arguments, script_call};
use super::results::script_value;
use super::snippets;
use super::validators::javascript_error;

pub(super) const EXECUTE_SCRIPT: CommandMapping =
    CommandMapping::new(map_execute_script_request, map_execute_script_response);
pub(super) const EXECUTE_ASYNC_SCRIPT: CommandMapping =
    CommandMapping::new(map_execute_async_script_request, map_execute_script_response);

fn map_execute_script_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    let body = optional_str(params, "script").unwrap_or_default();
    Ok(script_call(
        context,
        &snippets::sync_script(body),
        script_arguments(params),
        ResultOwnership::None,
    ))
}

fn map_execute_async_script_request(
    params: &Value,
    context: Option<&ContextId>,
) -> Result<ProtocolRequest> {
    let body = optional_str(params, "script").unwrap_or_default();
    Ok(script_call(
        context,
        &snippets::async_script(body),
        script_arguments(params),
        ResultOwnership::None,
    ))
}

fn map_execute_script_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    if let Some(error) = javascript_error(result) {
        return Ok(error);
    }
    Ok(ClassicResponse::value(script_value(result)))
}
