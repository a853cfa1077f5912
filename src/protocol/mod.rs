//! Protocol message types for both sides of the bridge.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`ClassicCommand`] | Caller → Bridge | Classic command identifier |
//! | [`ProtocolTask`] | Bridge → Browser | BiDi command with correlation id |
//! | [`InboundFrame`] | Browser → Bridge | Reply, orphan error or event |
//! | [`ClassicResponse`] | Bridge → Caller | Classic success or error body |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `classic` | Classic response shapes and error codes |
//! | `command` | Classic command enum |
//! | `event` | BiDi events and prompt events |
//! | `request` | BiDi tasks, replies and inbound frames |

// ============================================================================
// Submodules
// ============================================================================

/// Classic response shapes and error codes.
pub mod classic;

/// Classic command identifiers.
pub mod command;

/// Event message types.
pub mod event;

/// Protocol tasks and inbound frames.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use classic::{ClassicError, ClassicResponse, ErrorCode};
pub use command::ClassicCommand;
pub use event::{Event, PromptEvent};
pub use request::{
    InboundFrame, InternalMethod, ProtocolError, ProtocolReply, ProtocolRequest, ProtocolTask,
};
