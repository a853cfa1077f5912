//! Error types for the WebDriver BiDi bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use webdriver_bidi_bridge::{Error, Result};
//!
//! fn title(bridge: &BridgeRemoteConnection) -> Result<serde_json::Value> {
//!     let response = bridge.execute("getTitle", &serde_json::json!({}))?;
//!     Ok(response.to_json())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Bridge | [`Error::CommandNotMapped`], [`Error::BiDiExecution`], [`Error::BridgeStopped`] |
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::InvalidArgument`], [`Error::Protocol`], [`Error::RequestTimeout`] |
//! | Upload | [`Error::Upload`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::TaskId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Bridge Errors
    // ========================================================================
    /// No request or response mapper is registered for a classic command.
    ///
    /// This is an integration bug and is never retried.
    #[error("{command} is not mapped to BiDi.")]
    CommandNotMapped {
        /// The classic command name.
        command: String,
    },

    /// The browser returned a BiDi error with no classic equivalent.
    #[error("BiDi: {error} - {message}")]
    BiDiExecution {
        /// Raw BiDi error identifier.
        error: String,
        /// Message reported by the browser.
        message: String,
    },

    /// The bridge was torn down while a task was outstanding.
    #[error("BiDi bridge was stopped. Reason: {reason}")]
    BridgeStopped {
        /// Why the bridge stopped.
        reason: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Timed out while opening the BiDi socket.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Invalid or missing argument in classic command params.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Protocol violation or unexpected response shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// A protocol round-trip exceeded the configured command timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The protocol task id that timed out.
        request_id: TaskId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Upload Errors
    // ========================================================================
    /// Uploaded file payload could not be decoded or extracted.
    #[error("Upload error: {message}")]
    Upload {
        /// Description of the upload failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a command-not-mapped error.
    #[inline]
    pub fn command_not_mapped(command: impl Into<String>) -> Self {
        Self::CommandNotMapped {
            command: command.into(),
        }
    }

    /// Creates a BiDi execution error.
    #[inline]
    pub fn bidi_execution(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BiDiExecution {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Creates a bridge-stopped error.
    #[inline]
    pub fn bridge_stopped(reason: impl Into<String>) -> Self {
        Self::BridgeStopped {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: TaskId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates an upload error.
    #[inline]
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` for the three bridge-level failures a classic caller can observe.
    #[inline]
    #[must_use]
    pub fn is_bridge_error(&self) -> bool {
        matches!(
            self,
            Self::CommandNotMapped { .. } | Self::BiDiExecution { .. } | Self::BridgeStopped { .. }
        )
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_bridge_error_display() {
        assert_eq!(
            Error::command_not_mapped("foo.bar").to_string(),
            "foo.bar is not mapped to BiDi."
        );
        assert_eq!(
            Error::bidi_execution("no such script", "script gone").to_string(),
            "BiDi: no such script - script gone"
        );
        assert_eq!(
            Error::bridge_stopped("BiDi connection pool stopped").to_string(),
            "BiDi bridge was stopped. Reason: BiDi connection pool stopped"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("missing websocket url");
        assert_eq!(err.to_string(), "Configuration error: missing websocket url");
    }

    #[test]
    fn test_is_bridge_error() {
        assert!(Error::command_not_mapped("x").is_bridge_error());
        assert!(Error::bridge_stopped("x").is_bridge_error());
        assert!(!Error::ConnectionClosed.is_bridge_error());
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::request_timeout(TaskId::new(3), 500);
        assert!(timeout_err.is_timeout());
        assert!(!Error::connection("test").is_timeout());
        assert_eq!(timeout_err.to_string(), "Request 3 timed out after 500ms");
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::connection_timeout(1000).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
