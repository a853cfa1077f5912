//! Drop-in classic transport backed by the BiDi pool.
//!
//! [`BridgeRemoteConnection`] is called from ordinary threads, hands each
//! command to the pool's task handler and blocks until it is resolved.
//! Calls made on a runtime thread cannot block on the runtime they would be
//! waiting for, so those are served by the legacy connection instead.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::identifiers::ContextId;
use crate::protocol::{ClassicCommand, ClassicResponse};
use crate::transport::TaskSender;

use super::context::{current_context, switch_context};
use super::handoff::is_handoff_worker;
use super::task::{ClassicTask, ClassicTaskContainer};

// ============================================================================
// RemoteConnection
// ============================================================================

/// The classic transport contract: execute one command synchronously.
pub trait RemoteConnection: Send + Sync {
    /// Executes `command` with `params` and returns the classic response.
    ///
    /// # Errors
    ///
    /// Transport level failures. Classic errors reported by the browser are
    /// returned as [`ClassicResponse::Error`].
    fn execute(&self, command: &str, params: &Value) -> Result<ClassicResponse>;
}

// ============================================================================
// BridgeRemoteConnection
// ============================================================================

/// Classic transport that routes commands through a running bridge pool.
pub struct BridgeRemoteConnection {
    ingress: TaskSender,
    legacy: Arc<dyn RemoteConnection>,
}

impl std::fmt::Debug for BridgeRemoteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeRemoteConnection")
            .field("ingress", &self.ingress)
            .finish_non_exhaustive()
    }
}

impl BridgeRemoteConnection {
    /// Wraps the pool ingress returned by `BridgePool::start` and the legacy
    /// connection used for fallbacks.
    #[must_use]
    pub fn new(ingress: TaskSender, legacy: Arc<dyn RemoteConnection>) -> Self {
        Self { ingress, legacy }
    }

    fn on_runtime_thread() -> bool {
        Handle::try_current().is_ok() && !is_handoff_worker()
    }

    /// Current context of the caller, asking the legacy connection once.
    fn resolve_context(&self) -> Result<Option<ContextId>> {
        if let Some(context) = current_context() {
            return Ok(Some(context));
        }

        let response = self.legacy.execute(
            ClassicCommand::GetCurrentWindowHandle.as_str(),
            &json!({}),
        )?;

        let Some(handle) = response.success_value().and_then(Value::as_str) else {
            warn!("Legacy connection returned no window handle");
            return Ok(None);
        };

        let context = ContextId::new(handle);
        debug!(%context, "Resolved initial browsing context");
        switch_context(Some(context.clone()));
        Ok(Some(context))
    }
}

impl RemoteConnection for BridgeRemoteConnection {
    fn execute(&self, command: &str, params: &Value) -> Result<ClassicResponse> {
        if Self::on_runtime_thread() {
            trace!(command, "Runtime thread call served by legacy connection");
            return self.legacy.execute(command, params);
        }

        let context = self.resolve_context()?;

        if command == ClassicCommand::GetCurrentWindowHandle.as_str()
            && let Some(context) = &context
        {
            return Ok(ClassicResponse::value(Value::from(context.as_str())));
        }

        let (container, receiver) =
            ClassicTaskContainer::new(ClassicTask::new(command, params.clone(), context));
        self.ingress.blocking_send(container)?;

        let response = receiver.wait()?;
        if let Some(context) = response.switch_context() {
            debug!(%context, "Switching browsing context");
            switch_context(Some(context.clone()));
        }

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
