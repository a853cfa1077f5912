//! Translation of BiDi error identifiers into classic errors.
//!
//! The table below is the only place where BiDi error names meet classic
//! error codes. Identifiers with no faithful classic equivalent are not
//! approximated; they surface as [`Error::BiDiExecution`].

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::protocol::{ClassicError, ErrorCode, ProtocolError};

// ============================================================================
// Error Table
// ============================================================================

/// How a BiDi error identifier translates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTranslation {
    /// Maps onto a classic error code.
    Classic(ErrorCode),
    /// Known to have no classic equivalent.
    Unmappable,
}

/// Looks up a BiDi error identifier.
///
/// Returns `None` for identifiers the bridge has never heard of.
#[must_use]
pub fn translate(error: &str) -> Option<ErrorTranslation> {
    use ErrorCode as C;
    use ErrorTranslation::{Classic, Unmappable};

    let translation = match error {
        "invalid argument" => Classic(C::InvalidArgument),
        "invalid selector" => Classic(C::InvalidSelector),
        "invalid session id" => Classic(C::InvalidSessionId),
        "move target out of bounds" => Classic(C::MoveTargetOutOfBounds),
        "no such alert" => Classic(C::NoAlertOpen),
        "no such element" | "no such node" | "no such handle" => Classic(C::NoSuchElement),
        "no such frame" => Classic(C::NoSuchFrame),
        "no such window" | "no such client window" => Classic(C::NoSuchWindow),
        "no such cookie" => Classic(C::NoSuchCookie),
        "stale element reference" => Classic(C::StaleElementReference),
        "element not interactable" => Classic(C::ElementNotInteractable),
        "element click intercepted" => Classic(C::ElementClickIntercepted),
        "javascript error" => Classic(C::JavascriptError),
        "timeout" => Classic(C::Timeout),
        "script timeout" => Classic(C::ScriptTimeout),
        "session not created" => Classic(C::SessionNotCreated),
        "unable to capture screen" => Classic(C::UnableToCaptureScreen),
        "unable to set cookie" => Classic(C::UnableToSetCookie),
        "unexpected alert open" => Classic(C::UnexpectedAlertOpen),
        "unknown command" => Classic(C::UnknownCommand),
        "unknown error" => Classic(C::UnknownError),
        "unsupported operation" => Classic(C::UnsupportedOperation),
        "detached shadow root" => Classic(C::DetachedShadowRoot),
        "invalid web extension"
        | "unable to set file input"
        | "no such script"
        | "no such history entry"
        | "no such network collector"
        | "no such intercept"
        | "no such network data"
        | "no such request"
        | "no such storage partition"
        | "no such user context"
        | "no such web extension"
        | "unable to close browser"
        | "underspecified storage partition"
        | "unavailable network data" => Unmappable,
        _ => return None,
    };

    Some(translation)
}

/// Converts a BiDi error payload into a classic error.
///
/// The message defaults to the classic error string when the browser sent
/// none; the stacktrace is carried over unchanged.
///
/// # Errors
///
/// Returns [`Error::BiDiExecution`] for unknown or unmappable identifiers.
pub fn map_protocol_error(error: &ProtocolError) -> Result<ClassicError> {
    match translate(&error.error) {
        Some(ErrorTranslation::Classic(code)) => Ok(ClassicError::new(code)
            .with_message(error.message.clone())
            .with_stacktrace(error.stacktrace.clone())),
        Some(ErrorTranslation::Unmappable) | None => Err(Error::bidi_execution(
            error.error.clone(),
            error.message.clone(),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================
