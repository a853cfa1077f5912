//! Current browsing context of the caller.
//!
//! Blocking callers keep their context in thread-local storage. Async callers
//! can scope one to a task with [`with_task_context`]; inside such a scope
//! the task value shadows the thread value.

// ============================================================================
// Imports
// ============================================================================

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;

use crate::identifiers::ContextId;

// ============================================================================
// Storage
// ============================================================================

thread_local! {
    static THREAD_CONTEXT: RefCell<Option<ContextId>> = const { RefCell::new(None) };
}

tokio::task_local! {
    static TASK_CONTEXT: RefCell<Option<ContextId>>;
}

fn in_task_scope() -> bool {
    TASK_CONTEXT.try_with(|_| ()).is_ok()
}

// ============================================================================
// Public API
// ============================================================================

/// Returns the caller's current browsing context.
#[must_use]
pub fn current_context() -> Option<ContextId> {
    TASK_CONTEXT
        .try_with(|context| context.borrow().clone())
        .unwrap_or_else(|_| THREAD_CONTEXT.with(|context| context.borrow().clone()))
}

/// Replaces the caller's current browsing context and returns the previous one.
pub fn switch_context(context: Option<ContextId>) -> Option<ContextId> {
    if in_task_scope() {
        TASK_CONTEXT.with(|slot| slot.replace(context))
    } else {
        THREAD_CONTEXT.with(|slot| slot.replace(context))
    }
}

/// Makes `context` current until the returned guard is dropped.
///
/// ```
/// use webdriver_bidi_bridge::bridge::{current_context, use_context};
/// use webdriver_bidi_bridge::ContextId;
///
/// {
///     let _guard = use_context(ContextId::new("tab-2"));
///     assert_eq!(current_context(), Some(ContextId::new("tab-2")));
/// }
/// assert_eq!(current_context(), None);
/// ```
#[must_use = "the context is restored as soon as the guard is dropped"]
pub fn use_context(context: ContextId) -> ContextGuard {
    ContextGuard {
        previous: switch_context(Some(context)),
        _not_send: PhantomData,
    }
}

/// Restores the previous browsing context on drop.
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<ContextId>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        switch_context(self.previous.take());
    }
}

/// Runs `future` with its own task-scoped browsing context.
pub async fn with_task_context<F>(context: Option<ContextId>, future: F) -> F::Output
where
    F: Future,
{
    TASK_CONTEXT.scope(RefCell::new(context), future).await
}

// ============================================================================
// ContextSnapshot
// ============================================================================

/// A copy of the current context that can be carried to another thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSnapshot {
    context: Option<ContextId>,
}

impl ContextSnapshot {
    /// Captures the caller's current context.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            context: current_context(),
        }
    }

    /// Installs the snapshot as the current context, returning the replaced one.
    pub fn apply(self) -> Option<ContextId> {
        switch_context(self.context)
    }

    /// The captured context.
    #[must_use]
    pub fn context(&self) -> Option<&ContextId> {
        self.context.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================
