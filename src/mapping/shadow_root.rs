//! Element lookup inside a shadow root.

use serde_json::Value;

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::ProtocolRequest;

use super::CommandMapping;
use super::args::{locate_nodes, shadow_root_argument};
use super::element::{map_find_element_response, map_find_elements_response};

pub(super) const FIND_ELEMENT_FROM_SHADOW_ROOT: CommandMapping =
    CommandMapping::new(map_find_element_request, map_find_element_response);
pub(super) const FIND_ELEMENTS_FROM_SHADOW_ROOT: CommandMapping =
    CommandMapping::new(map_find_elements_request, map_find_elements_response);

fn map_find_element_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    locate_nodes(context, params, true, Some(shadow_root_argument(params)?))
}

fn map_find_elements_request(params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
    locate_nodes(context, params, false, Some(shadow_root_argument(params)?))
}
