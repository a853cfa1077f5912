//! Classic WebDriver command identifiers.
//!
//! The classic client names each command with a fixed string
//! (`"get"`, `"w3cExecuteScript"`, `"clickElement"`, ...). This module turns
//! those strings into a closed enum so that the mapping registry can match
//! exhaustively.
//!
//! | Category | Examples |
//! |----------|----------|
//! | Navigation | `get`, `refresh`, `goBack`, `getTitle` |
//! | Window | `w3cGetWindowHandles`, `close`, `setScreenOrientation` |
//! | Script | `w3cExecuteScript`, `w3cExecuteScriptAsync` |
//! | Capture | `screenshot`, `printPage`, `getPageSource` |
//! | Element | `findElement`, `findElementsFromShadowRoot` |
//! | Web element | `clickElement`, `sendKeysToElement`, `getElementRect` |
//! | Alert | `w3cGetAlertText`, `w3cAcceptAlert` |
//! | Other | `switchToWindow`, `newWindow`, `uploadFile`, `executeCdpCommand` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ============================================================================
// ClassicCommand
// ============================================================================

/// A classic WebDriver command known to the bridge.
///
/// Some variants are recognised but deliberately have no BiDi mapping
/// (frames, active element, window rect); dispatching them fails with
/// [`Error::CommandNotMapped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassicCommand {
    // Navigation
    Get,
    GetCurrentUrl,
    Refresh,
    GoBack,
    GoForward,
    GetTitle,

    // Window
    GetWindowHandles,
    GetCurrentWindowHandle,
    Close,
    GetScreenOrientation,
    SetScreenOrientation,

    // Script
    ExecuteScript,
    ExecuteAsyncScript,

    // Capture
    Screenshot,
    PrintPage,
    GetPageSource,

    // Element lookup
    FindElement,
    FindElements,
    FindElementFromShadowRoot,
    FindElementsFromShadowRoot,

    // Switch-to
    SwitchToWindow,
    NewWindow,

    // File
    UploadFile,

    // Vendor passthrough
    ExecuteCdpCommand,

    // Alert
    GetAlertText,
    AcceptAlert,
    DismissAlert,
    SetAlertValue,

    // Web element
    GetElementTagName,
    GetElementText,
    ClickElement,
    ClearElement,
    GetElementProperty,
    GetElementAttribute,
    IsElementSelected,
    IsElementEnabled,
    SendKeysToElement,
    GetShadowRoot,
    GetElementRect,
    GetElementValueOfCssProperty,
    GetElementAriaRole,
    GetElementAriaLabel,
    ElementScreenshot,
    FindChildElement,
    FindChildElements,

    // Recognised, unsupported
    SwitchToFrame,
    SwitchToParentFrame,
    GetActiveElement,
    GetWindowRect,
    SetWindowRect,
    MaximizeWindow,
    MinimizeWindow,
    FullscreenWindow,
}

impl ClassicCommand {
    /// Every command, in declaration order.
    pub const ALL: &'static [ClassicCommand] = &[
        Self::Get,
        Self::GetCurrentUrl,
        Self::Refresh,
        Self::GoBack,
        Self::GoForward,
        Self::GetTitle,
        Self::GetWindowHandles,
        Self::GetCurrentWindowHandle,
        Self::Close,
        Self::GetScreenOrientation,
        Self::SetScreenOrientation,
        Self::ExecuteScript,
        Self::ExecuteAsyncScript,
        Self::Screenshot,
        Self::PrintPage,
        Self::GetPageSource,
        Self::FindElement,
        Self::FindElements,
        Self::FindElementFromShadowRoot,
        Self::FindElementsFromShadowRoot,
        Self::SwitchToWindow,
        Self::NewWindow,
        Self::UploadFile,
        Self::ExecuteCdpCommand,
        Self::GetAlertText,
        Self::AcceptAlert,
        Self::DismissAlert,
        Self::SetAlertValue,
        Self::GetElementTagName,
        Self::GetElementText,
        Self::ClickElement,
        Self::ClearElement,
        Self::GetElementProperty,
        Self::GetElementAttribute,
        Self::IsElementSelected,
        Self::IsElementEnabled,
        Self::SendKeysToElement,
        Self::GetShadowRoot,
        Self::GetElementRect,
        Self::GetElementValueOfCssProperty,
        Self::GetElementAriaRole,
        Self::GetElementAriaLabel,
        Self::ElementScreenshot,
        Self::FindChildElement,
        Self::FindChildElements,
        Self::SwitchToFrame,
        Self::SwitchToParentFrame,
        Self::GetActiveElement,
        Self::GetWindowRect,
        Self::SetWindowRect,
        Self::MaximizeWindow,
        Self::MinimizeWindow,
        Self::FullscreenWindow,
    ];

    /// Returns the classic wire name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::GetCurrentUrl => "getCurrentUrl",
            Self::Refresh => "refresh",
            Self::GoBack => "goBack",
            Self::GoForward => "goForward",
            Self::GetTitle => "getTitle",
            Self::GetWindowHandles => "w3cGetWindowHandles",
            Self::GetCurrentWindowHandle => "w3cGetCurrentWindowHandle",
            Self::Close => "close",
            Self::GetScreenOrientation => "getScreenOrientation",
            Self::SetScreenOrientation => "setScreenOrientation",
            Self::ExecuteScript => "w3cExecuteScript",
            Self::ExecuteAsyncScript => "w3cExecuteScriptAsync",
            Self::Screenshot => "screenshot",
            Self::PrintPage => "printPage",
            Self::GetPageSource => "getPageSource",
            Self::FindElement => "findElement",
            Self::FindElements => "findElements",
            Self::FindElementFromShadowRoot => "findElementFromShadowRoot",
            Self::FindElementsFromShadowRoot => "findElementsFromShadowRoot",
            Self::SwitchToWindow => "switchToWindow",
            Self::NewWindow => "newWindow",
            Self::UploadFile => "uploadFile",
            Self::ExecuteCdpCommand => "executeCdpCommand",
            Self::GetAlertText => "w3cGetAlertText",
            Self::AcceptAlert => "w3cAcceptAlert",
            Self::DismissAlert => "w3cDismissAlert",
            Self::SetAlertValue => "w3cSetAlertValue",
            Self::GetElementTagName => "getElementTagName",
            Self::GetElementText => "getElementText",
            Self::ClickElement => "clickElement",
            Self::ClearElement => "clearElement",
            Self::GetElementProperty => "getElementProperty",
            Self::GetElementAttribute => "getElementAttribute",
            Self::IsElementSelected => "isElementSelected",
            Self::IsElementEnabled => "isElementEnabled",
            Self::SendKeysToElement => "sendKeysToElement",
            Self::GetShadowRoot => "getShadowRoot",
            Self::GetElementRect => "getElementRect",
            Self::GetElementValueOfCssProperty => "getElementValueOfCssProperty",
            Self::GetElementAriaRole => "getElementAriaRole",
            Self::GetElementAriaLabel => "getElementAriaLabel",
            Self::ElementScreenshot => "elementScreenshot",
            Self::FindChildElement => "findChildElement",
            Self::FindChildElements => "findChildElements",
            Self::SwitchToFrame => "switchToFrame",
            Self::SwitchToParentFrame => "switchToParentFrame",
            Self::GetActiveElement => "w3cGetActiveElement",
            Self::GetWindowRect => "getWindowRect",
            Self::SetWindowRect => "setWindowRect",
            Self::MaximizeWindow => "w3cMaximizeWindow",
            Self::MinimizeWindow => "minimizeWindow",
            Self::FullscreenWindow => "fullscreenWindow",
        }
    }

    /// Parses a classic command name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandNotMapped`] for names the bridge does not know.
    pub fn parse(name: &str) -> Result<Self, Error> {
        name.parse()
    }
}

impl FromStr for ClassicCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| Error::command_not_mapped(s))
    }
}

impl fmt::Display for ClassicCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
