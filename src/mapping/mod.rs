//! Classic command to BiDi mapping.
//!
//! Each supported [`ClassicCommand`] has a [`CommandMapping`]: a pure request
//! mapper turning classic parameters into a [`ProtocolRequest`], and a pure
//! response mapper turning the BiDi `result` back into a [`ClassicResponse`].
//! BiDi errors take a separate path through [`redirect_error_response`].
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use webdriver_bidi_bridge::mapping::{map_request, map_response};
//!
//! let request = map_request("get", &json!({"url": "https://example.com"}), None)?;
//! assert_eq!(request.method, "browsingContext.navigate");
//!
//! let response = map_response("get", &json!({}), &json!({"url": "https://example.com"}))?;
//! assert!(response.is_success());
//! # Ok::<(), webdriver_bidi_bridge::Error>(())
//! ```
//!
//! # Modules
//!
//! | Module | Commands |
//! |--------|----------|
//! | `navigation` | navigate, history, title, current url |
//! | `window` | handles, close, screen orientation |
//! | `script` | synchronous and asynchronous execute script |
//! | `capture` | screenshot, print, page source |
//! | `element`, `shadow_root` | element lookup |
//! | `web_element` | operations on a returned element |
//! | `switch_to` | switch window, new window |
//! | `alert` | user prompts |
//! | `file`, `cdp` | upload, DevTools passthrough |

// ============================================================================
// Submodules
// ============================================================================

mod alert;
mod args;
mod capture;
mod cdp;
mod element;
mod errors;
mod file;
mod navigation;
mod redirect;
mod results;
mod script;
mod shadow_root;
mod snippets;
mod switch_to;
mod validators;
mod values;
mod web_element;
mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use errors::{ErrorTranslation, map_protocol_error, translate};
pub use redirect::{redirect_error, redirect_error_response};
pub use values::{
    ELEMENT_KEY, SHADOW_ROOT_KEY, element_reference, from_remote_value, shadow_root_reference,
    to_local_value,
};

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::ContextId;
use crate::protocol::{ClassicCommand, ClassicResponse, ProtocolRequest};

// ============================================================================
// CommandMapping
// ============================================================================

/// Builds the BiDi request for a classic command.
pub type RequestMapper = fn(&Value, Option<&ContextId>) -> Result<ProtocolRequest>;

/// Builds the classic response from a BiDi result and the original params.
pub type ResponseMapper = fn(&Value, &Value) -> Result<ClassicResponse>;

/// Request and response mappers for one command.
#[derive(Clone, Copy)]
pub struct CommandMapping {
    request: RequestMapper,
    response: ResponseMapper,
}

impl CommandMapping {
    pub(crate) const fn new(request: RequestMapper, response: ResponseMapper) -> Self {
        Self { request, response }
    }

    /// Runs the request mapper.
    pub fn map_request(&self, params: &Value, context: Option<&ContextId>) -> Result<ProtocolRequest> {
        (self.request)(params, context)
    }

    /// Runs the response mapper.
    pub fn map_response(&self, result: &Value, params: &Value) -> Result<ClassicResponse> {
        (self.response)(result, params)
    }
}

impl std::fmt::Debug for CommandMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandMapping").finish_non_exhaustive()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Returns the mapping for `command`, or `None` if it has no BiDi equivalent.
pub fn mapping_for(command: ClassicCommand) -> Option<CommandMapping> {
    use ClassicCommand as C;

    let mapping = match command {
        C::Get => navigation::GET,
        C::GetCurrentUrl => navigation::GET_CURRENT_URL,
        C::Refresh => navigation::REFRESH,
        C::GoBack => navigation::GO_BACK,
        C::GoForward => navigation::GO_FORWARD,
        C::GetTitle => navigation::GET_TITLE,

        C::GetWindowHandles => window::GET_WINDOW_HANDLES,
        C::GetCurrentWindowHandle => window::GET_CURRENT_WINDOW_HANDLE,
        C::Close => window::CLOSE,
        C::GetScreenOrientation => window::GET_SCREEN_ORIENTATION,
        C::SetScreenOrientation => window::SET_SCREEN_ORIENTATION,

        C::ExecuteScript => script::EXECUTE_SCRIPT,
        C::ExecuteAsyncScript => script::EXECUTE_ASYNC_SCRIPT,

        C::Screenshot => capture::SCREENSHOT,
        C::PrintPage => capture::PRINT_PAGE,
        C::GetPageSource => capture::GET_PAGE_SOURCE,

        C::FindElement => element::FIND_ELEMENT,
        C::FindElements => element::FIND_ELEMENTS,
        C::FindElementFromShadowRoot => shadow_root::FIND_ELEMENT_FROM_SHADOW_ROOT,
        C::FindElementsFromShadowRoot => shadow_root::FIND_ELEMENTS_FROM_SHADOW_ROOT,

        C::SwitchToWindow => switch_to::SWITCH_TO_WINDOW,
        C::NewWindow => switch_to::NEW_WINDOW,

        C::UploadFile => file::UPLOAD_FILE,
        C::ExecuteCdpCommand => cdp::EXECUTE_CDP_COMMAND,

        C::GetAlertText => alert::GET_ALERT_TEXT,
        C::AcceptAlert => alert::ACCEPT_ALERT,
        C::DismissAlert => alert::DISMISS_ALERT,
        C::SetAlertValue => alert::SET_ALERT_VALUE,

        C::GetElementTagName => web_element::GET_TAG_NAME,
        C::GetElementText => web_element::GET_TEXT,
        C::ClickElement => web_element::CLICK,
        C::ClearElement => web_element::CLEAR,
        C::GetElementProperty => web_element::GET_PROPERTY,
        C::GetElementAttribute => web_element::GET_ATTRIBUTE,
        C::IsElementSelected => web_element::IS_SELECTED,
        C::IsElementEnabled => web_element::IS_ENABLED,
        C::SendKeysToElement => web_element::SEND_KEYS,
        C::GetShadowRoot => web_element::GET_SHADOW_ROOT,
        C::GetElementRect => web_element::GET_RECT,
        C::GetElementValueOfCssProperty => web_element::GET_CSS_VALUE,
        C::GetElementAriaRole => web_element::GET_ARIA_ROLE,
        C::GetElementAriaLabel => web_element::GET_ARIA_LABEL,
        C::ElementScreenshot => web_element::ELEMENT_SCREENSHOT,
        C::FindChildElement => web_element::FIND_CHILD_ELEMENT,
        C::FindChildElements => web_element::FIND_CHILD_ELEMENTS,

        C::SwitchToFrame
        | C::SwitchToParentFrame
        | C::GetActiveElement
        | C::GetWindowRect
        | C::SetWindowRect
        | C::MaximizeWindow
        | C::MinimizeWindow
        | C::FullscreenWindow => return None,
    };

    Some(mapping)
}

fn lookup(command: &str) -> Result<CommandMapping> {
    let parsed = ClassicCommand::parse(command)?;
    mapping_for(parsed).ok_or_else(|| Error::command_not_mapped(command))
}

/// Returns `true` if `command` is a classic command with a BiDi mapping.
pub fn is_mapped(command: &str) -> bool {
    lookup(command).is_ok()
}

/// Maps a classic command into a BiDi request.
///
/// # Errors
///
/// - [`Error::CommandNotMapped`] if the command is unknown or unsupported
/// - [`Error::InvalidArgument`] if a required parameter is missing
pub fn map_request(
    command: &str,
    params: &Value,
    context: Option<&ContextId>,
) -> Result<ProtocolRequest> {
    let request = lookup(command)?.map_request(params, context)?;
    trace!(command, method = %request.method, "Mapped classic request");
    Ok(request)
}

/// Maps a successful BiDi result back into a classic response.
///
/// # Errors
///
/// - [`Error::CommandNotMapped`] if the command is unknown or unsupported
/// - [`Error::Protocol`] if the result is missing a required field
pub fn map_response(command: &str, result: &Value, params: &Value) -> Result<ClassicResponse> {
    lookup(command)?.map_response(result, params)
}

// ============================================================================
// Tests
// ============================================================================
