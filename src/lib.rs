//! WebDriver BiDi Bridge - classic WebDriver commands over one BiDi socket.
//!
//! This library lets synchronous, classic WebDriver callers drive a browser
//! through its WebDriver BiDi endpoint without changing their call sites.
//!
//! # Architecture
//!
//! The bridge sits between blocking callers and the async BiDi socket:
//!
//! - **Callers (threads)**: Call [`RemoteConnection::execute`] and block
//! - **Pool (tokio)**: Maps each command to BiDi, sends it, maps the reply back
//!
//! Key design principles:
//!
//! - One [`BridgePool`] owns exactly one socket and its correlation table
//! - Replies are matched to callers purely by task id, in any order
//! - Commands and their mappers form a closed, exhaustively matched table
//! - Shutdown resolves every outstanding task, so no caller blocks forever
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use serde_json::{Value, json};
//! use webdriver_bidi_bridge::{
//!     BridgeConfig, BridgePool, BridgeRemoteConnection, ClassicResponse, RemoteConnection, Result,
//! };
//!
//! struct Legacy;
//!
//! impl RemoteConnection for Legacy {
//!     fn execute(&self, _command: &str, _params: &Value) -> Result<ClassicResponse> {
//!         Ok(ClassicResponse::value(json!("initial-context")))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = BridgeConfig::new("ws://127.0.0.1:9222/session")?;
//!     let pool = BridgePool::new(config);
//!     let ingress = pool.start().await?;
//!
//!     let remote = BridgeRemoteConnection::new(ingress, Arc::new(Legacy));
//!     let title = std::thread::spawn(move || remote.execute("getTitle", &json!({})))
//!         .join()
//!         .expect("caller thread");
//!     println!("{:?}", title?.to_json());
//!
//!     pool.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Task containers, [`BridgeRemoteConnection`], context, handoff |
//! | [`config`] | [`BridgeConfig`] and its builder |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`mapping`] | Classic to BiDi request and response mappers |
//! | [`protocol`] | Classic and BiDi message types |
//! | [`transport`] | WebSocket connection and [`BridgePool`] |
//! | [`upload`] | Local handling of uploaded archives |

// ============================================================================
// Modules
// ============================================================================

/// Caller-facing bridge: task containers, remote connection, handoff.
pub mod bridge;

/// Bridge configuration.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for browsing contexts and protocol tasks.
pub mod identifiers;

/// Classic command to BiDi mapping.
pub mod mapping;

/// Classic and BiDi message types.
pub mod protocol;

/// WebSocket transport layer.
///
/// Owns the BiDi socket, the correlation table and the pool lifecycle.
pub mod transport;

/// Uploaded archive handling.
pub mod upload;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{
    BlockingScope, BridgeRemoteConnection, ClassicTask, ClassicTaskContainer, HandoffOptions,
    RemoteConnection, ThreadHandoff, current_context, switch_context, use_context,
};

// Configuration
pub use config::{BridgeConfig, BridgeConfigBuilder};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ContextId, TaskId};

// Protocol types
pub use protocol::{ClassicCommand, ClassicError, ClassicResponse, ErrorCode};

// Transport types
pub use transport::{BridgePool, PoolState, TaskSender};
