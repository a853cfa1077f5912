//! Protocol task and inbound frame types.
//!
//! Defines the BiDi wire format for outbound commands and the frames
//! the browser sends back.
//!
//! | Direction | Shape |
//! |-----------|-------|
//! | Outbound | `{"id": 1, "method": "module.method", "params": {...}}` |
//! | Inbound success | `{"id": 1, "result": {...}}` |
//! | Inbound error | `{"id": 1, "error": "...", "message": "...", "stacktrace": "..."}` |
//! | Inbound event | `{"method": "module.event", "params": {...}}` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::identifiers::TaskId;

use super::event::Event;

// ============================================================================
// Internal Methods
// ============================================================================

/// Method names that are answered by the pool itself and never reach the socket.
///
/// The `bridge:` prefix cannot collide with a BiDi module name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalMethod {
    /// Answer "get alert text" from the active prompt map.
    GetAlertText,
    /// Decode an uploaded zip archive onto local disk.
    UploadFile,
}

impl InternalMethod {
    /// Returns the sentinel method name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetAlertText => "bridge:internal.getAlertText",
            Self::UploadFile => "bridge:internal.uploadFile",
        }
    }

    /// Recognises a sentinel method name.
    #[must_use]
    pub fn from_method(method: &str) -> Option<Self> {
        [Self::GetAlertText, Self::UploadFile]
            .into_iter()
            .find(|internal| internal.as_str() == method)
    }
}

// ============================================================================
// ProtocolRequest
// ============================================================================

/// Result of request mapping: a method and its params, not yet assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolRequest {
    /// BiDi method (`browsingContext.navigate`) or an internal sentinel.
    pub method: String,
    /// Method params.
    pub params: Value,
}

impl ProtocolRequest {
    /// Creates a request for a remote BiDi method.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Creates a request handled locally by the pool.
    #[inline]
    #[must_use]
    pub fn internal(method: InternalMethod, params: Value) -> Self {
        Self::new(method.as_str(), params)
    }

    /// Returns the internal method if this request never touches the socket.
    #[inline]
    #[must_use]
    pub fn internal_method(&self) -> Option<InternalMethod> {
        InternalMethod::from_method(&self.method)
    }
}

// ============================================================================
// ProtocolTask
// ============================================================================

/// An outbound BiDi command with its correlation id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolTask {
    /// Correlation id.
    pub id: TaskId,
    /// BiDi method.
    pub method: String,
    /// Method params.
    pub params: Value,
}

impl ProtocolTask {
    /// Assigns an id to a mapped request.
    #[inline]
    #[must_use]
    pub fn new(id: TaskId, request: ProtocolRequest) -> Self {
        Self {
            id,
            method: request.method,
            params: request.params,
        }
    }
}

// ============================================================================
// ProtocolReply
// ============================================================================

/// Error payload of a failed BiDi command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProtocolError {
    /// BiDi error identifier (`no such frame`, `invalid argument`, ...).
    pub error: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Remote stacktrace, if any.
    #[serde(default)]
    pub stacktrace: String,
}

impl ProtocolError {
    /// Creates an error payload.
    #[must_use]
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            stacktrace: String::new(),
        }
    }
}

/// Resolution of a protocol task: the `result` object or an error payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolReply {
    /// The `result` member of a success frame.
    Success(Value),
    /// The error members of an error frame.
    Failure(ProtocolError),
}

impl ProtocolReply {
    /// Wraps a plain value the way the remote end wraps script results.
    #[inline]
    #[must_use]
    pub fn value(value: Value) -> Self {
        Self::Success(json!({ "value": value }))
    }

    /// Returns `true` if this is an error reply.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

// ============================================================================
// InboundFrame
// ============================================================================

#[derive(Debug, Deserialize)]
struct ErrorFrame {
    id: Option<TaskId>,
    #[serde(flatten)]
    error: ProtocolError,
}

#[derive(Debug, Deserialize)]
struct SuccessFrame {
    id: TaskId,
    result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFrame {
    Error(ErrorFrame),
    Success(SuccessFrame),
    Event(Event),
}

/// A frame read from the BiDi socket.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Response to an outbound task.
    Reply {
        /// Correlation id of the task.
        id: TaskId,
        /// Payload.
        reply: ProtocolReply,
    },
    /// Error frame the browser could not attribute to a command.
    OrphanError(ProtocolError),
    /// Unsolicited event.
    Event(Event),
}

impl InboundFrame {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the text matches none of the frame shapes.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let frame = match serde_json::from_str::<RawFrame>(text)? {
            RawFrame::Error(ErrorFrame { id: Some(id), error }) => Self::Reply {
                id,
                reply: ProtocolReply::Failure(error),
            },
            RawFrame::Error(ErrorFrame { id: None, error }) => Self::OrphanError(error),
            RawFrame::Success(SuccessFrame { id, result }) => Self::Reply {
                id,
                reply: ProtocolReply::Success(result),
            },
            RawFrame::Event(event) => Self::Event(event),
        };
        Ok(frame)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serialization() {
        let request = ProtocolRequest::new(
            "browsingContext.navigate",
            json!({"context": "c1", "url": "https://example.com"}),
        );
        let task = ProtocolTask::new(TaskId::new(7), request);
        let json = serde_json::to_value(&task).expect("serialize");

        assert_eq!(
            json,
            json!({
                "id": 7,
                "method": "browsingContext.navigate",
                "params": {"context": "c1", "url": "https://example.com"}
            })
        );
    }

    #[test]
    fn test_internal_method_detection() {
        let request = ProtocolRequest::internal(InternalMethod::GetAlertText, json!({}));
        assert_eq!(request.internal_method(), Some(InternalMethod::GetAlertText));

        let remote = ProtocolRequest::new("script.evaluate", json!({}));
        assert_eq!(remote.internal_method(), None);
    }

    #[test]
    fn test_parse_success_frame() {
        let frame = InboundFrame::parse(r#"{"type":"success","id":3,"result":{"contexts":[]}}"#)
            .expect("parse");
        assert_eq!(
            frame,
            InboundFrame::Reply {
                id: TaskId::new(3),
                reply: ProtocolReply::Success(json!({"contexts": []})),
            }
        );
    }

    #[test]
    fn test_parse_error_frame() {
        let frame = InboundFrame::parse(
            r#"{"type":"error","id":4,"error":"no such frame","message":"gone"}"#,
        )
        .expect("parse");

        let InboundFrame::Reply { id, reply } = frame else {
            panic!("expected reply");
        };
        assert_eq!(id, TaskId::new(4));
        assert_eq!(
            reply,
            ProtocolReply::Failure(ProtocolError::new("no such frame", "gone"))
        );
    }

    #[test]
    fn test_parse_orphan_error() {
        let frame = InboundFrame::parse(
            r#"{"type":"error","id":null,"error":"invalid argument","message":"bad json"}"#,
        )
        .expect("parse");
        assert!(matches!(frame, InboundFrame::OrphanError(_)));
    }

    #[test]
    fn test_parse_event_frame() {
        let frame = InboundFrame::parse(
            r#"{"type":"event","method":"browsingContext.load","params":{"context":"c1"}}"#,
        )
        .expect("parse");

        let InboundFrame::Event(event) = frame else {
            panic!("expected event");
        };
        assert_eq!(event.method, "browsingContext.load");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(InboundFrame::parse(r#"{"hello":"world"}"#).is_err());
        assert!(InboundFrame::parse("not json").is_err());
    }
}
