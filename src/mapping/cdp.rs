//! Chromium DevTools passthrough via the `goog:cdp` BiDi extension module.

use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{context_value, required_str};

pub(super) const EXECUTE_CDP_COMMAND: CommandMapping =
    CommandMapping::new(map_execute_cdp_request, map_execute_cdp_response);

fn map_execute_cdp_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::new(
        "goog:cdp.sendCommand",
        json!({
            "method": required_str(params, "cmd")?,
            "params": params.get("params").cloned().unwrap_or_else(|| json!({})),
            "browsingContext": context_value(context),
        }),
    ))
}

fn map_execute_cdp_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    Ok(ClassicResponse::value(
        result.get("result").cloned().unwrap_or(Value::Null),
    ))
}
