//! Caller-facing side of the bridge.
//!
//! Blocking callers talk to [`BridgeRemoteConnection`]; it packs each
//! command into a [`ClassicTaskContainer`], hands it to the pool and waits.
//! [`ThreadHandoff`] covers the opposite direction, letting async code run
//! blocking closures with bounded concurrency.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `task` | Classic and protocol task containers |
//! | `context` | Current browsing context storage |
//! | `handoff` | Blocking closure handoff and scopes |
//! | `remote` | Classic transport backed by the pool |

// ============================================================================
// Submodules
// ============================================================================

/// Current browsing context storage.
pub mod context;

/// Blocking closure handoff.
pub mod handoff;

/// Classic transport backed by the pool.
pub mod remote;

/// Task models and containers.
pub mod task;

// ============================================================================
// Re-exports
// ============================================================================

pub use context::{
    ContextGuard, ContextSnapshot, current_context, switch_context, use_context, with_task_context,
};
pub use handoff::{BlockingScope, HandoffOptions, ThreadHandoff, is_handoff_worker};
pub use remote::{BridgeRemoteConnection, RemoteConnection};
pub use task::{
    ClassicTask, ClassicTaskContainer, ClassicTaskReceiver, ProtocolReplyReceiver,
    ProtocolTaskContainer,
};
