//! File upload, answered locally by the pool.

use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicResponse, InternalMethod, ProtocolRequest};

use super::CommandMapping;
use super::args::required_str;

pub(super) const UPLOAD_FILE: CommandMapping =
    CommandMapping::new(map_upload_file_request, map_internal_value_response);

fn map_upload_file_request(params: &Value, _context: Option<&ContextId>) -> Result<ProtocolRequest> {
    Ok(ProtocolRequest::internal(
        InternalMethod::UploadFile,
        json!({ "file": required_str(params, "file")? }),
    ))
}

/// `result.value` of an internally answered request.
pub(super) fn map_internal_value_response(result: &Value, _params: &Value) -> Result<ClassicResponse> {
    Ok(ClassicResponse::value(
        result.get("value").cloned().unwrap_or(Value::Null),
    ))
}
