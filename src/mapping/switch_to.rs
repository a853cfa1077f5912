//! Window switching and tab creation.
//!
//! Both responses carry a context-switch marker so the bridge moves the
//! caller's current browsing context along with it.

use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, ProtocolRequest};

use super::CommandMapping;
use super::args::{get_tree, required_str};
use super::results::{first_context, str_field};

pub(super) const SWITCH_TO_WINDOW: CommandMapping =
    CommandMapping::new(map_switch_to_window_request, map_switch_to_window_response);
pub(super) const NEW_WINDOW: CommandMapping =
    CommandMapping::new(map_new_window_request, map_new_window_response);

fn map_switch_to_window_request(params: &Value, _context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(get_tree(Some(required_str(params, "handle")?)))
}

fn map_switch_to_window_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    let context = str_field(first_context(result)?, "context")?;
    Ok(ClassicResponse::void().with_switch_context(ContextId::new(context)))
}

/// New windows are always opened as tabs, whatever type was requested.
const NEW_WINDOW_TYPE: &str = "tab";

fn map_new_window_request(_params: &Value, _context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::new(
        "browsingContext.create",
        json!({ "type": NEW_WINDOW_TYPE }),
    ))
}

fn map_new_window_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    let context = str_field(result, "context")?;
    Ok(
        ClassicResponse::value(json!({ "handle": context, "type": NEW_WINDOW_TYPE }))
            .with_switch_context(ContextId::new(context)),
    )
}
