//! Page capture: screenshots, printing and page source.

use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{context_value, script_evaluate};
use super::navigation::map_script_primitive_response;
use super::results::field;
use super::snippets;

pub(super) const SCREENSHOT: CommandMapping =
    CommandMapping::new(map_screenshot_request, map_data_response);
pub(super) const PRINT_PAGE: CommandMapping =
    CommandMapping::new(map_print_request, map_data_response);
pub(super) const GET_PAGE_SOURCE: CommandMapping =
    CommandMapping::new(map_page_source_request, map_script_primitive_response);

fn map_screenshot_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::new(
        "browsingContext.captureScreenshot",
        json!({ "context": context_value(context) }),
    ))
}

/// Classic print options pass through; BiDi uses the same names.
fn map_print_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    let mut bidi = params.as_object().cloned().unwrap_or_else(Map::new);
    bidi.insert("context".into(), context_value(context));
    Ok(ProtocolRequest::new("browsingContext.print", Value::Object(bidi)))
}

fn map_page_source_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(script_evaluate(context, snippets::GET_PAGE_SOURCE))
}

/// Base64 payload of a capture or print result.
pub(super) fn map_data_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    Ok(ClassicResponse::value(field(result, "data")?.clone()))
}
