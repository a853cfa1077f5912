//! Task models and their completion slots.
//!
//! A [`ClassicTask`] travels from a blocked calling thread to the pool's task
//! handler inside a [`ClassicTaskContainer`]; the caller keeps the matching
//! [`ClassicTaskReceiver`]. A [`ProtocolTaskContainer`] plays the same role
//! between the task handler and the socket's response dispatcher.
//!
//! Both containers are resolved exactly once. Dropping an unresolved
//! container wakes its waiter with [`Error::BridgeStopped`].

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::identifiers::{ContextId, TaskId};
use crate::protocol::{ClassicResponse, ProtocolReply, ProtocolTask};

// ============================================================================
// ClassicTask
// ============================================================================

/// A classic command as issued by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicTask {
    command: String,
    params: Value,
    context: Option<ContextId>,
}

impl ClassicTask {
    /// Creates a task for `command` against the given browsing context.
    #[must_use]
    pub fn new(command: impl Into<String>, params: Value, context: Option<ContextId>) -> Self {
        Self {
            command: command.into(),
            params,
            context,
        }
    }

    /// Classic command name.
    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Classic parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Browsing context the command targets.
    #[inline]
    #[must_use]
    pub fn context(&self) -> Option<&ContextId> {
        self.context.as_ref()
    }
}

// ============================================================================
// ClassicTaskContainer
// ============================================================================

/// A classic task paired with the slot its caller waits on.
#[derive(Debug)]
pub struct ClassicTaskContainer {
    task: ClassicTask,
    responder: oneshot::Sender<Result<ClassicResponse>>,
}

impl ClassicTaskContainer {
    /// Wraps `task` and returns the receiver the caller blocks on.
    #[must_use]
    pub fn new(task: ClassicTask) -> (Self, ClassicTaskReceiver) {
        let (responder, receiver) = oneshot::channel();
        (Self { task, responder }, ClassicTaskReceiver { receiver })
    }

    /// The wrapped task.
    #[inline]
    #[must_use]
    pub fn task(&self) -> &ClassicTask {
        &self.task
    }

    /// Returns `true` once the caller stopped waiting.
    #[inline]
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }

    /// Writes the outcome and wakes the caller.
    pub fn resolve(self, result: Result<ClassicResponse>) {
        // The caller may have given up; nothing to report then.
        let _ = self.responder.send(result);
    }
}

/// Completion side of a [`ClassicTaskContainer`].
#[derive(Debug)]
pub struct ClassicTaskReceiver {
    receiver: oneshot::Receiver<Result<ClassicResponse>>,
}

impl ClassicTaskReceiver {
    /// Blocks the current thread until the task is resolved.
    ///
    /// Must not be called from inside an async task.
    ///
    /// # Errors
    ///
    /// The resolved error, or [`Error::BridgeStopped`] if the container was
    /// dropped unresolved.
    pub fn wait(self) -> Result<ClassicResponse> {
        self.receiver.blocking_recv().map_err(|_| dropped())?
    }

    /// Async counterpart of [`wait`](Self::wait).
    ///
    /// # Errors
    ///
    /// Same as [`wait`](Self::wait).
    pub async fn wait_async(self) -> Result<ClassicResponse> {
        self.receiver.await.map_err(|_| dropped())?
    }
}

fn dropped() -> Error {
    Error::bridge_stopped("task dropped before completion")
}

// ============================================================================
// ProtocolTaskContainer
// ============================================================================

/// Receiver the task handler awaits for a protocol reply.
pub type ProtocolReplyReceiver = oneshot::Receiver<Result<ProtocolReply>>;

/// A protocol task paired with the slot the task handler awaits.
///
/// Lives in the correlation table from dispatch until its reply arrives.
#[derive(Debug)]
pub struct ProtocolTaskContainer {
    task: ProtocolTask,
    responder: oneshot::Sender<Result<ProtocolReply>>,
}

impl ProtocolTaskContainer {
    /// Wraps `task` and returns the receiver for its reply.
    #[must_use]
    pub fn new(task: ProtocolTask) -> (Self, ProtocolReplyReceiver) {
        let (responder, receiver) = oneshot::channel();
        (Self { task, responder }, receiver)
    }

    /// Correlation id of the task.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.task.id
    }

    /// The wrapped task.
    #[inline]
    #[must_use]
    pub fn task(&self) -> &ProtocolTask {
        &self.task
    }

    pub(crate) fn into_parts(self) -> (ProtocolTask, oneshot::Sender<Result<ProtocolReply>>) {
        (self.task, self.responder)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::ProtocolRequest;

    #[test]
    fn test_classic_task_accessors() {
        let task = ClassicTask::new("get", json!({"url": "x"}), Some(ContextId::new("c1")));
        assert_eq!(task.command(), "get");
        assert_eq!(task.params()["url"], "x");
        assert_eq!(task.context().map(ContextId::as_str), Some("c1"));
    }

    #[test]
    fn test_resolve_wakes_blocking_waiter() {
        let (container, receiver) = ClassicTaskContainer::new(ClassicTask::new("get", json!({}), None));

        let waiter = std::thread::spawn(move || receiver.wait());
        container.resolve(Ok(ClassicResponse::value(json!(1))));

        let response = waiter.join().expect("join").expect("resolved");
        assert_eq!(response.success_value(), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_dropped_container_reports_bridge_stopped() {
        let (container, receiver) = ClassicTaskContainer::new(ClassicTask::new("get", json!({}), None));
        drop(container);

        let err = receiver.wait_async().await.unwrap_err();
        assert!(matches!(err, Error::BridgeStopped { .. }));
    }

    #[test]
    fn test_abandoned_container() {
        let (container, receiver) = ClassicTaskContainer::new(ClassicTask::new("get", json!({}), None));
        assert!(!container.is_abandoned());
        drop(receiver);
        assert!(container.is_abandoned());
    }

    #[tokio::test]
    async fn test_protocol_container_parts() {
        let task = ProtocolTask::new(TaskId::new(3), ProtocolRequest::new("session.status", json!({})));
        let (container, receiver) = ProtocolTaskContainer::new(task);
        assert_eq!(container.id(), TaskId::new(3));

        let (task, responder) = container.into_parts();
        assert_eq!(task.method, "session.status");
        let _ = responder.send(Ok(ProtocolReply::Success(json!({"ready": true}))));

        let reply = receiver.await.expect("sent").expect("ok");
        assert_eq!(reply, ProtocolReply::Success(json!({"ready": true})));
    }
}
