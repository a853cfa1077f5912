//! Command-aware refinement of classic errors.
//!
//! BiDi reports some failures at a coarser granularity than classic
//! WebDriver. A `no such frame` for a top-level context really means the
//! window is gone; a `no such element` for a cached element handle really
//! means the element went stale. The rules below fix that up based on which
//! command produced the error.
//!
//! | Order | Commands | From | To |
//! |-------|----------|------|----|
//! | 1 | window scoped | no such frame | no such window |
//! | 2 | alert | invalid argument mentioning alert/prompt | no such alert |
//! | 3 | element identity | no such element | stale element reference |
//! | 4 | shadow root lookup | no such element | detached shadow root |

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::protocol::{ClassicCommand, ClassicError, ClassicResponse, ErrorCode, ProtocolError};

use super::errors::map_protocol_error;
use super::validators::STALE_ELEMENT_MESSAGE;

// ============================================================================
// Constants
// ============================================================================

const DETACHED_SHADOW_ROOT_MESSAGE: &str =
    "detached shadow root: shadow root is no longer attached to the document";

// ============================================================================
// Command Categories
// ============================================================================

/// Commands addressing the current top-level window.
fn is_window_scoped(command: ClassicCommand) -> bool {
    use ClassicCommand as C;
    matches!(
        command,
        C::SwitchToWindow
            | C::GetCurrentUrl
            | C::GetTitle
            | C::Close
            | C::Screenshot
            | C::PrintPage
            | C::GetPageSource
            | C::SetScreenOrientation
            | C::GetScreenOrientation
    )
}

fn is_alert(command: ClassicCommand) -> bool {
    use ClassicCommand as C;
    matches!(
        command,
        C::GetAlertText | C::AcceptAlert | C::DismissAlert | C::SetAlertValue
    )
}

/// Commands addressing a previously found element by its handle.
fn is_element_identity(command: ClassicCommand) -> bool {
    use ClassicCommand as C;
    matches!(
        command,
        C::GetElementTagName
            | C::GetElementText
            | C::ClickElement
            | C::ClearElement
            | C::GetElementProperty
            | C::GetElementAttribute
            | C::IsElementSelected
            | C::IsElementEnabled
            | C::SendKeysToElement
            | C::GetShadowRoot
            | C::GetElementRect
            | C::GetElementValueOfCssProperty
            | C::GetElementAriaRole
            | C::GetElementAriaLabel
            | C::ElementScreenshot
            | C::FindChildElement
            | C::FindChildElements
    )
}

fn is_shadow_root_lookup(command: ClassicCommand) -> bool {
    matches!(
        command,
        ClassicCommand::FindElementFromShadowRoot | ClassicCommand::FindElementsFromShadowRoot
    )
}

// ============================================================================
// Redirection
// ============================================================================

/// Applies the first redirect rule whose command category matches.
#[must_use]
pub fn redirect_error(command: ClassicCommand, error: ClassicError) -> ClassicError {
    if is_window_scoped(command) {
        if error.code == ErrorCode::NoSuchFrame {
            return retarget(error, ErrorCode::NoSuchWindow, ErrorCode::NoSuchWindow.as_str());
        }
        return error;
    }

    if is_alert(command) {
        let message = error.message.to_lowercase();
        if error.code == ErrorCode::InvalidArgument
            && (message.contains("alert") || message.contains("prompt"))
        {
            return retarget(error, ErrorCode::NoAlertOpen, ErrorCode::NoAlertOpen.as_str());
        }
        return error;
    }

    if is_element_identity(command) {
        if error.code == ErrorCode::NoSuchElement {
            return retarget(error, ErrorCode::StaleElementReference, STALE_ELEMENT_MESSAGE);
        }
        return error;
    }

    if is_shadow_root_lookup(command) && error.code == ErrorCode::NoSuchElement {
        return retarget(error, ErrorCode::DetachedShadowRoot, DETACHED_SHADOW_ROOT_MESSAGE);
    }

    error
}

fn retarget(error: ClassicError, code: ErrorCode, message: &str) -> ClassicError {
    ClassicError::new(code)
        .with_message(message)
        .with_stacktrace(error.stacktrace)
}

/// Maps a BiDi error payload for `command` into a classic error response.
///
/// # Errors
///
/// - [`crate::Error::CommandNotMapped`] if `command` is unknown
/// - [`crate::Error::BiDiExecution`] if the BiDi error has no classic equivalent
pub fn redirect_error_response(command: &str, error: &ProtocolError) -> Result<ClassicResponse> {
    let command = ClassicCommand::parse(command)?;
    let classic = map_protocol_error(error)?;
    Ok(ClassicResponse::error(redirect_error(command, classic)))
}

// ============================================================================
// Tests
// ============================================================================
