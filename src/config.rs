//! Bridge configuration.
//!
//! Provides a fluent builder for [`BridgeConfig`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use webdriver_bidi_bridge::BridgeConfig;
//!
//! # fn example() -> webdriver_bidi_bridge::Result<()> {
//! let config = BridgeConfig::builder()
//!     .websocket_url("ws://127.0.0.1:9222/session/abc")
//!     .buffer_size(64)
//!     .command_timeout(Duration::from_secs(60))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default number of calling threads allowed in the worker pool at once.
pub const DEFAULT_MAX_WORKERS: usize = 40;

/// Default timeout for opening the BiDi socket.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// BridgeConfig
// ============================================================================

/// Validated bridge configuration.
///
/// Use [`BridgeConfig::builder()`] to create one.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    websocket_url: Url,
    buffer_size: Option<usize>,
    max_workers: usize,
    connect_timeout: Duration,
    command_timeout: Option<Duration>,
}

impl BridgeConfig {
    /// Creates a new configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Creates a configuration with defaults for everything but the URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is not a valid `ws`/`wss` URL.
    pub fn new(websocket_url: impl Into<String>) -> Result<Self> {
        Self::builder().websocket_url(websocket_url).build()
    }

    /// Returns the BiDi WebSocket URL.
    #[inline]
    #[must_use]
    pub fn websocket_url(&self) -> &Url {
        &self.websocket_url
    }

    /// Returns the ingress queue capacity (`None` = unbounded).
    #[inline]
    #[must_use]
    pub fn buffer_size(&self) -> Option<usize> {
        self.buffer_size
    }

    /// Returns the handoff concurrency limit.
    #[inline]
    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Returns the socket connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per round-trip timeout, if any.
    #[inline]
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }
}

// ============================================================================
// BridgeConfigBuilder
// ============================================================================

/// Builder for [`BridgeConfig`].
#[derive(Debug, Clone)]
pub struct BridgeConfigBuilder {
    websocket_url: Option<String>,
    buffer_size: Option<usize>,
    max_workers: usize,
    connect_timeout: Duration,
    command_timeout: Option<Duration>,
}

impl Default for BridgeConfigBuilder {
    fn default() -> Self {
        Self {
            websocket_url: None,
            buffer_size: None,
            max_workers: DEFAULT_MAX_WORKERS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: None,
        }
    }
}

impl BridgeConfigBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the BiDi WebSocket URL (`ws://` or `wss://`).
    #[inline]
    #[must_use]
    pub fn websocket_url(mut self, url: impl Into<String>) -> Self {
        self.websocket_url = Some(url.into());
        self
    }

    /// Bounds the classic-task ingress queue.
    ///
    /// Without this the queue is unbounded.
    #[inline]
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Sets how many blocking handoffs may run concurrently.
    #[inline]
    #[must_use]
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Sets the timeout for opening the socket.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets a timeout for each protocol round-trip.
    #[inline]
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL is missing, unparsable or not `ws`/`wss`
    /// - [`Error::Config`] if `buffer_size` or `max_workers` is zero
    pub fn build(self) -> Result<BridgeConfig> {
        let websocket_url = self.validate_url()?;

        if self.buffer_size == Some(0) {
            return Err(Error::config(
                "buffer_size must be greater than zero; omit it for an unbounded queue",
            ));
        }

        if self.max_workers == 0 {
            return Err(Error::config("max_workers must be greater than zero"));
        }

        Ok(BridgeConfig {
            websocket_url,
            buffer_size: self.buffer_size,
            max_workers: self.max_workers,
            connect_timeout: self.connect_timeout,
            command_timeout: self.command_timeout,
        })
    }

    fn validate_url(&self) -> Result<Url> {
        let raw = self.websocket_url.as_deref().ok_or_else(|| {
            Error::config(
                "WebSocket URL is required. Use .websocket_url() to set it.\n\
                 Example: BridgeConfig::builder().websocket_url(\"ws://127.0.0.1:9222/session\")",
            )
        })?;

        let url = Url::parse(raw)
            .map_err(|e| Error::config(format!("Invalid WebSocket URL '{raw}': {e}")))?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "WebSocket URL must use ws:// or wss://, got '{other}://'"
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
