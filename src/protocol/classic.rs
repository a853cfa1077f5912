//! Classic WebDriver response shapes and error codes.
//!
//! Success: `{"value": <any>}`.
//! Error: `{"status": <int>, "value": {"error", "message", "stacktrace"}}`.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Value, json};

use crate::identifiers::ContextId;

// ============================================================================
// ErrorCode
// ============================================================================

/// Classic error codes with their legacy numeric status.
///
/// Codes that never had a numeric status (invalid session id, no such shadow
/// root, detached shadow root) report 13, the unknown-error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoSuchElement,
    NoSuchFrame,
    UnknownCommand,
    StaleElementReference,
    InvalidElementState,
    UnknownError,
    ElementNotSelectable,
    JavascriptError,
    Timeout,
    NoSuchWindow,
    UnableToSetCookie,
    UnexpectedAlertOpen,
    NoAlertOpen,
    ScriptTimeout,
    InvalidElementCoordinates,
    InvalidSelector,
    SessionNotCreated,
    MoveTargetOutOfBounds,
    ElementNotInteractable,
    InvalidArgument,
    NoSuchCookie,
    UnableToCaptureScreen,
    ElementClickIntercepted,
    UnsupportedOperation,
    InvalidSessionId,
    NoSuchShadowRoot,
    DetachedShadowRoot,
}

impl ErrorCode {
    /// Legacy numeric status.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::NoSuchElement => 7,
            Self::NoSuchFrame => 8,
            Self::UnknownCommand => 9,
            Self::StaleElementReference => 10,
            Self::InvalidElementState => 12,
            Self::UnknownError
            | Self::InvalidSessionId
            | Self::NoSuchShadowRoot
            | Self::DetachedShadowRoot => 13,
            Self::ElementNotSelectable => 15,
            Self::JavascriptError => 17,
            Self::Timeout => 21,
            Self::NoSuchWindow => 23,
            Self::UnableToSetCookie => 25,
            Self::UnexpectedAlertOpen => 26,
            Self::NoAlertOpen => 27,
            Self::ScriptTimeout => 28,
            Self::InvalidElementCoordinates => 29,
            Self::InvalidSelector => 32,
            Self::SessionNotCreated => 33,
            Self::MoveTargetOutOfBounds => 34,
            Self::ElementNotInteractable => 60,
            Self::InvalidArgument => 61,
            Self::NoSuchCookie => 62,
            Self::UnableToCaptureScreen => 63,
            Self::ElementClickIntercepted => 64,
            Self::UnsupportedOperation => 405,
        }
    }

    /// Classic error string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoSuchElement => "no such element",
            Self::NoSuchFrame => "no such frame",
            Self::UnknownCommand => "unknown command",
            Self::StaleElementReference => "stale element reference",
            Self::InvalidElementState => "invalid element state",
            Self::UnknownError => "unknown error",
            Self::ElementNotSelectable => "element not selectable",
            Self::JavascriptError => "javascript error",
            Self::Timeout => "timeout",
            Self::NoSuchWindow => "no such window",
            Self::UnableToSetCookie => "unable to set cookie",
            Self::UnexpectedAlertOpen => "unexpected alert open",
            Self::NoAlertOpen => "no such alert",
            Self::ScriptTimeout => "script timeout",
            Self::InvalidElementCoordinates => "invalid element coordinates",
            Self::InvalidSelector => "invalid selector",
            Self::SessionNotCreated => "session not created",
            Self::MoveTargetOutOfBounds => "move target out of bounds",
            Self::ElementNotInteractable => "element not interactable",
            Self::InvalidArgument => "invalid argument",
            Self::NoSuchCookie => "no such cookie",
            Self::UnableToCaptureScreen => "unable to capture screen",
            Self::ElementClickIntercepted => "element click intercepted",
            Self::UnsupportedOperation => "unsupported operation",
            Self::InvalidSessionId => "invalid session id",
            Self::NoSuchShadowRoot => "no such shadow root",
            Self::DetachedShadowRoot => "detached shadow root",
        }
    }
}

// ============================================================================
// ClassicError
// ============================================================================

/// A classic error response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicError {
    /// Error code.
    pub code: ErrorCode,
    /// Message shown to the caller.
    pub message: String,
    /// Remote stacktrace, empty when unknown.
    pub stacktrace: String,
}

impl ClassicError {
    /// Creates an error whose message defaults to the error string.
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.as_str().to_string(),
            stacktrace: String::new(),
        }
    }

    /// Replaces the message; an empty message keeps the default.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = message;
        }
        self
    }

    /// Replaces the stacktrace.
    #[must_use]
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = stacktrace.into();
        self
    }

    /// Legacy numeric status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.code.status()
    }
}

// ============================================================================
// ClassicResponse
// ============================================================================

/// Response handed back to a classic caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassicResponse {
    /// `{"value": ...}`, optionally telling the caller to switch context.
    Success {
        /// Response value.
        value: Value,
        /// New active browsing context for the caller's later commands.
        switch_context: Option<ContextId>,
    },
    /// Classic error response.
    Error(ClassicError),
}

impl ClassicResponse {
    /// Success response with a value.
    #[inline]
    #[must_use]
    pub fn value(value: Value) -> Self {
        Self::Success {
            value,
            switch_context: None,
        }
    }

    /// Success response with a `null` value.
    #[inline]
    #[must_use]
    pub fn void() -> Self {
        Self::value(Value::Null)
    }

    /// Error response.
    #[inline]
    #[must_use]
    pub fn error(error: ClassicError) -> Self {
        Self::Error(error)
    }

    /// Attaches a context-switch marker to a success response.
    #[must_use]
    pub fn with_switch_context(self, context: ContextId) -> Self {
        match self {
            Self::Success { value, .. } => Self::Success {
                value,
                switch_context: Some(context),
            },
            error => error,
        }
    }

    /// Returns `true` for success responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the success value, if any.
    #[must_use]
    pub fn success_value(&self) -> Option<&Value> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Returns the error body, if any.
    #[must_use]
    pub fn as_error(&self) -> Option<&ClassicError> {
        match self {
            Self::Success { .. } => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Returns the context-switch marker, if any.
    #[must_use]
    pub fn switch_context(&self) -> Option<&ContextId> {
        match self {
            Self::Success { switch_context, .. } => switch_context.as_ref(),
            Self::Error(_) => None,
        }
    }

    /// Renders the classic wire shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Success { value, .. } => json!({ "value": value }),
            Self::Error(error) => json!({
                "status": error.status(),
                "value": {
                    "error": error.code.as_str(),
                    "message": error.message,
                    "stacktrace": error.stacktrace,
                }
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
