//! Event message types.
//!
//! Events are unsolicited frames the browser pushes over the BiDi socket.
//! The bridge only acts on user prompt events; everything else is dropped.
//!
//! | Method | Effect |
//! |--------|--------|
//! | `browsingContext.userPromptOpened` | record prompt text for the context |
//! | `browsingContext.userPromptClosed` | forget the context's prompt |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::ContextId;

// ============================================================================
// Constants
// ============================================================================

/// Event emitted when an alert, confirm, prompt or beforeunload dialog opens.
pub const USER_PROMPT_OPENED: &str = "browsingContext.userPromptOpened";

/// Event emitted when a user prompt is dismissed or accepted.
pub const USER_PROMPT_CLOSED: &str = "browsingContext.userPromptClosed";

// ============================================================================
// Event
// ============================================================================

/// An event notification from the browser.
///
/// # Format
///
/// ```json
/// {
///   "type": "event",
///   "method": "module.eventName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    /// Event name in `module.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Parses the event into a prompt event, if it is one.
    #[must_use]
    pub fn as_prompt_event(&self) -> Option<PromptEvent> {
        let context = self.params.get("context")?.as_str().map(ContextId::from)?;

        match self.method.as_str() {
            USER_PROMPT_OPENED => {
                let message = self
                    .params
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Some(PromptEvent::Opened { context, message })
            }
            USER_PROMPT_CLOSED => Some(PromptEvent::Closed { context }),
            _ => None,
        }
    }
}

// ============================================================================
// PromptEvent
// ============================================================================

/// A user prompt lifecycle event for one browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// A prompt opened; `message` is empty when the browser sent none.
    Opened {
        /// Context showing the prompt.
        context: ContextId,
        /// Prompt text.
        message: String,
    },
    /// The prompt of `context` closed.
    Closed {
        /// Context whose prompt closed.
        context: ContextId,
    },
}

// ============================================================================
// Tests
// ============================================================================
