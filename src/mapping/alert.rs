//! User prompt commands.
//!
//! BiDi can accept or dismiss a prompt but has no query for its text, so
//! "get alert text" is answered by the pool from prompt-opened events.

use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{InternalMethod, ProtocolRequest};

use super::CommandMapping;
use super::args::{context_value, required_str};
use super::file::map_internal_value_response;
use super::results::void;

pub(super) const GET_ALERT_TEXT: CommandMapping =
    CommandMapping::new(map_get_alert_text_request, map_internal_value_response);
pub(super) const ACCEPT_ALERT: CommandMapping = CommandMapping::new(map_accept_alert_request, void);
pub(super) const DISMISS_ALERT: CommandMapping = CommandMapping::new(map_dismiss_alert_request, void);
pub(super) const SET_ALERT_VALUE: CommandMapping =
    CommandMapping::new(map_set_alert_value_request, void);

fn map_get_alert_text_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::internal(
        InternalMethod::GetAlertText,
        json!({ "context": context_value(context) }),
    ))
}

fn handle_user_prompt(context: Option<&ContextId>, accept: bool) -> ProtocolRequest {
    ProtocolRequest::new(
        "browsingContext.handleUserPrompt",
        json!({ "context": context_value(context), "accept": accept }),
    )
}

fn map_accept_alert_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(handle_user_prompt(context, true))
}

fn map_dismiss_alert_request(_params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(handle_user_prompt(context, false))
}

fn map_set_alert_value_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    let mut request = handle_user_prompt(context, true);
    request.params["userText"] = Value::from(required_str(params, "text")?);
    Ok(request)
}
