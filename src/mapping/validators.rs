//! Checks applied to BiDi results before they are mapped to classic values.
//!
//! Each validator returns `Some(ClassicResponse::Error)` when the result
//! actually encodes a failure, and `None` when mapping may continue.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::protocol::{ClassicError, ClassicResponse, ErrorCode};

use super::args::optional_str;

// ============================================================================
// Constants
// ============================================================================

/// Guard message substrings and the classic error each one stands for.
///
/// Order matters: the first substring found in the exception text wins.
const GUARD_ERRORS: &[(&str, ErrorCode)] = &[
    ("stale element reference", ErrorCode::StaleElementReference),
    ("no such shadow root", ErrorCode::NoSuchShadowRoot),
    ("element not interactable", ErrorCode::ElementNotInteractable),
    ("invalid element state", ErrorCode::InvalidElementState),
    ("element not selectable", ErrorCode::ElementNotSelectable),
    ("element click intercepted", ErrorCode::ElementClickIntercepted),
    ("invalid element coordinates", ErrorCode::InvalidElementCoordinates),
];

/// Message reported for stale elements.
pub const STALE_ELEMENT_MESSAGE: &str =
    "stale element reference: element is not attached to the page document";

// ============================================================================
// Script Exceptions
// ============================================================================

/// Text and formatted stack of a `script.*` result of type `exception`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptException {
    /// Exception text as reported by the browser.
    pub text: String,
    /// Stack rendered as `    at fn (url:line:col)` lines.
    pub stacktrace: String,
}

impl ScriptException {
    /// Extracts exception details, or `None` for successful evaluations.
    #[must_use]
    pub fn from_result(result: &Value) -> Option<Self> {
        if result.get("type").and_then(Value::as_str) != Some("exception") {
            return None;
        }

        let details = result.get("exceptionDetails");
        let text = details
            .and_then(|d| optional_str(d, "text"))
            .unwrap_or_default()
            .to_string();

        let frames = details
            .and_then(|d| d.get("stackTrace"))
            .and_then(|s| s.get("callFrames"))
            .and_then(Value::as_array);

        let stacktrace = frames
            .into_iter()
            .flatten()
            .map(|frame| {
                let function = optional_str(frame, "functionName")
                    .filter(|f| !f.is_empty())
                    .unwrap_or("anonymous");
                let url = optional_str(frame, "url")
                    .filter(|u| !u.is_empty())
                    .unwrap_or("unknown");
                let line = frame.get("lineNumber").and_then(Value::as_i64).unwrap_or(0);
                let column = frame.get("columnNumber").and_then(Value::as_i64).unwrap_or(0);
                format!("    at {function} ({url}:{line}:{column})")
            })
            .collect::<Vec<_>>()
            .join("\n");

        Some(Self { text, stacktrace })
    }
}

// ============================================================================
// Validators
// ============================================================================

/// Maps a script exception to a classic `javascript error`.
#[must_use]
pub fn javascript_error(result: &Value) -> Option<ClassicResponse> {
    let exception = ScriptException::from_result(result)?;
    if exception.text.is_empty() {
        return None;
    }

    Some(ClassicResponse::error(
        ClassicError::new(ErrorCode::JavascriptError)
            .with_message(format!("javascript error: {}", exception.text))
            .with_stacktrace(exception.stacktrace),
    ))
}

/// Maps a guard exception to its precise classic error.
///
/// Falls back to [`javascript_error`] when no guard text is present.
#[must_use]
pub fn element_exception(result: &Value) -> Option<ClassicResponse> {
    let exception = ScriptException::from_result(result)?;
    let lowered = exception.text.to_lowercase();

    let Some((needle, code)) = GUARD_ERRORS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
    else {
        return javascript_error(result);
    };

    let message = if *needle == "stale element reference" {
        STALE_ELEMENT_MESSAGE.to_string()
    } else {
        exception.text
    };

    Some(ClassicResponse::error(
        ClassicError::new(*code)
            .with_message(message)
            .with_stacktrace(exception.stacktrace),
    ))
}

/// `no such element` for a lookup that found nothing.
#[must_use]
pub fn no_such_element(request_params: &Value) -> ClassicResponse {
    let using = optional_str(request_params, "using").unwrap_or("unknown");
    let value = optional_str(request_params, "value").unwrap_or("unknown");
    let message = format!(
        "no such element: Unable to locate element: {{\"method\":\"{using}\",\"selector\":\"{value}\"}}"
    );

    ClassicResponse::error(ClassicError::new(ErrorCode::NoSuchElement).with_message(message))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn exception(text: &str) -> Value {
        json!({
            "type": "exception",
            "realm": "r1",
            "exceptionDetails": {
                "text": text,
                "columnNumber": 4,
                "lineNumber": 2,
                "exception": {"type": "error"},
                "stackTrace": {"callFrames": [
                    {"functionName": "", "url": "", "lineNumber": 2, "columnNumber": 4},
                    {"functionName": "click", "url": "https://a.test/app.js", "lineNumber": 10, "columnNumber": 1}
                ]}
            }
        })
    }

    #[test]
    fn test_success_is_not_an_exception() {
        let ok = json!({"type": "success", "result": {"type": "string", "value": "x"}});
        assert_eq!(ScriptException::from_result(&ok), None);
        assert_eq!(element_exception(&ok), None);
    }

    #[test]
    fn test_stacktrace_format() {
        let details = ScriptException::from_result(&exception("Error: boom")).expect("exception");
        assert_eq!(
            details.stacktrace,
            "    at anonymous (unknown:2:4)\n    at click (https://a.test/app.js:10:1)"
        );
    }

    #[test]
    fn test_stale_guard() {
        let response = element_exception(&exception("Error: stale element reference")).expect("error");
        let error = response.as_error().expect("classic error");
        assert_eq!(error.code, ErrorCode::StaleElementReference);
        assert_eq!(error.message, STALE_ELEMENT_MESSAGE);
    }

    #[test]
    fn test_click_intercepted_keeps_raw_message() {
        let text = "Error: element click intercepted: Element is obscured by DIV";
        let response = element_exception(&exception(text)).expect("error");
        let error = response.as_error().expect("classic error");
        assert_eq!(error.code, ErrorCode::ElementClickIntercepted);
        assert_eq!(error.status(), 64);
        assert_eq!(error.message, text);
    }

    #[test]
    fn test_unknown_exception_is_javascript_error() {
        let response = element_exception(&exception("TypeError: x is undefined")).expect("error");
        let error = response.as_error().expect("classic error");
        assert_eq!(error.code, ErrorCode::JavascriptError);
        assert_eq!(error.message, "javascript error: TypeError: x is undefined");
    }

    #[test]
    fn test_no_such_element_message() {
        let response = no_such_element(&json!({"using": "css selector", "value": "#x"}));
        let error = response.as_error().expect("classic error");
        assert_eq!(error.status(), 7);
        assert_eq!(
            error.message,
            r##"no such element: Unable to locate element: {"method":"css selector","selector":"#x"}"##
        );
    }
}
