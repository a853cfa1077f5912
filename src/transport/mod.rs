//! WebSocket transport layer.
//!
//! This module owns the single BiDi socket and the pool that multiplexes
//! classic callers over it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  BridgePool     │                              │  Browser        │
//! │                 │         WebSocket            │                 │
//! │  task handler   │─────────────────────────────►│  BiDi endpoint  │
//! │  → Connection   │◄─────────────────────────────│                 │
//! │                 │   replies, prompt events     │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `BridgePool::start` - Open the socket and spawn both loops
//! 2. `TaskSender` - Callers enqueue classic task containers
//! 3. `Connection::send` - Workers send protocol tasks and await replies
//! 4. `BridgePool::stop` - Resolve outstanding work and close the socket
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and response dispatcher |
//! | `pool` | Task handler loop and pool lifecycle |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and response dispatcher.
pub mod connection;

/// Bridge pool lifecycle and task handler.
pub mod pool;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use pool::{BridgePool, DEFAULT_STOP_REASON, PoolState, TaskSender};
