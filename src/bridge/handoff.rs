//! Running blocking code from the async side.
//!
//! [`ThreadHandoff`] moves a synchronous closure onto the runtime's blocking
//! pool. A semaphore bounds how many closures run at once, an optional shared
//! lock serializes callers that need exclusive access, and the caller's
//! browsing context can travel to the worker and back.
//!
//! Worker threads are marked, so a bridge call made from inside a handed-off
//! closure still goes through the pool instead of the legacy fallback.

// ============================================================================
// Imports
// ============================================================================

use std::cell::Cell;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tracing::trace;

use crate::config::DEFAULT_MAX_WORKERS;
use crate::error::{Error, Result};
use crate::identifiers::ContextId;

use super::context::{ContextSnapshot, current_context, switch_context};

// ============================================================================
// Worker Marker
// ============================================================================

thread_local! {
    static HANDOFF_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Returns `true` on a thread currently running a handed-off closure.
#[must_use]
pub fn is_handoff_worker() -> bool {
    HANDOFF_WORKER.with(Cell::get)
}

/// Marks the worker thread and restores its own context on every exit,
/// including unwinding.
struct WorkerMark {
    previous: bool,
    context: Option<ContextId>,
}

impl WorkerMark {
    fn enter() -> Self {
        Self {
            previous: HANDOFF_WORKER.with(|flag| flag.replace(true)),
            context: current_context(),
        }
    }
}

impl Drop for WorkerMark {
    fn drop(&mut self) {
        switch_context(self.context.take());
        HANDOFF_WORKER.with(|flag| flag.set(self.previous));
    }
}

// ============================================================================
// HandoffOptions
// ============================================================================

/// Per-call handoff options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffOptions {
    /// Hold the shared exclusive lock while the closure runs.
    pub exclusive: bool,
    /// Carry the caller's browsing context into the worker and back.
    pub exchange_context: bool,
}

impl Default for HandoffOptions {
    fn default() -> Self {
        Self {
            exclusive: false,
            exchange_context: true,
        }
    }
}

impl HandoffOptions {
    /// Options with the exclusive lock held.
    #[must_use]
    pub fn exclusive() -> Self {
        Self {
            exclusive: true,
            ..Self::default()
        }
    }
}

// ============================================================================
// ThreadHandoff
// ============================================================================

/// Bounded gateway from async code into blocking closures.
///
/// Cloning shares the limiter and the lock.
#[derive(Debug, Clone)]
pub struct ThreadHandoff {
    limiter: Arc<Semaphore>,
    lock: Arc<AsyncMutex<()>>,
    max_workers: usize,
}

impl Default for ThreadHandoff {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS)
    }
}

impl ThreadHandoff {
    /// Creates a handoff allowing `max_workers` concurrent closures.
    #[must_use]
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            limiter: Arc::new(Semaphore::new(max_workers)),
            lock: Arc::new(AsyncMutex::new(())),
            max_workers,
        }
    }

    /// Maximum number of concurrent closures.
    #[inline]
    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Number of closures that could start right now.
    #[inline]
    #[must_use]
    pub fn available_workers(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Runs `f` on the blocking pool and returns its output.
    ///
    /// A panic inside `f` is resumed on the caller.
    ///
    /// # Errors
    ///
    /// [`Error::BridgeStopped`] if the runtime cancels the worker.
    pub async fn sync_to_async<F, T>(&self, f: F, options: HandoffOptions) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|_| Error::bridge_stopped("handoff limiter closed"))?;

        let _exclusive = if options.exclusive {
            Some(Arc::clone(&self.lock).lock_owned().await)
        } else {
            None
        };

        let exchange = options.exchange_context;
        let inbound = exchange.then(ContextSnapshot::capture);

        let joined = tokio::task::spawn_blocking(move || {
            let _mark = WorkerMark::enter();
            if let Some(snapshot) = inbound {
                snapshot.apply();
            }

            let value = f();

            let outbound = exchange.then(ContextSnapshot::capture);
            (value, outbound)
        })
        .await;

        let (value, outbound) = match joined {
            Ok(output) => output,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(Error::bridge_stopped(format!("handoff worker cancelled: {e}"))),
        };

        if let Some(snapshot) = outbound {
            snapshot.apply();
        }

        trace!(exclusive = options.exclusive, "Handoff closure completed");
        Ok(value)
    }

    /// Runs `body` inside a blocking enter/exit scope.
    ///
    /// `factory` builds the scope, and `enter`/`exit` run on the blocking
    /// pool. When `body` fails and `exit` returns `true`, the error is
    /// suppressed and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Errors from `enter`, or from `body` unless suppressed by `exit`.
    pub async fn sync_to_async_scope<S, F, B, Fut, T>(
        &self,
        factory: F,
        body: B,
        options: HandoffOptions,
    ) -> Result<Option<T>>
    where
        S: BlockingScope,
        F: FnOnce() -> S + Send + 'static,
        B: FnOnce(S::Output) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (scope, entered) = self
            .sync_to_async(
                move || {
                    let mut scope = factory();
                    let entered = scope.enter();
                    (scope, entered)
                },
                options,
            )
            .await?;
        let resource = entered?;

        let outcome = body(resource).await;
        let failed = outcome.is_err();

        let suppress = self
            .sync_to_async(
                move || {
                    let mut scope = scope;
                    scope.exit(failed)
                },
                options,
            )
            .await?;

        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(_) if suppress => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// BlockingScope
// ============================================================================

/// A blocking resource with explicit enter and exit steps.
pub trait BlockingScope: Send + 'static {
    /// Value handed to the scoped body.
    type Output: Send + 'static;

    /// Acquires the resource.
    ///
    /// # Errors
    ///
    /// Any error aborts the scope before the body runs.
    fn enter(&mut self) -> Result<Self::Output>;

    /// Releases the resource. Returning `true` suppresses a body error.
    fn exit(&mut self, failed: bool) -> bool;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::bridge::context::with_task_context;

    #[tokio::test]
    async fn test_runs_closure_on_worker() {
        let handoff = ThreadHandoff::new(2);
        let marked = handoff
            .sync_to_async(is_handoff_worker, HandoffOptions::default())
            .await
            .expect("handoff");
        assert!(marked);
        assert!(!is_handoff_worker());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_limiter_bounds_concurrency() {
        let handoff = ThreadHandoff::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut calls = Vec::new();
        for _ in 0..6 {
            let handoff = handoff.clone();
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            calls.push(tokio::spawn(async move {
                handoff
                    .sync_to_async(
                        move || {
                            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(20));
                            running.fetch_sub(1, Ordering::SeqCst);
                        },
                        HandoffOptions::default(),
                    )
                    .await
            }));
        }
        for call in calls {
            call.await.expect("join").expect("handoff");
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(handoff.available_workers(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_exclusive_lock_serializes() {
        let handoff = ThreadHandoff::new(4);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut calls = Vec::new();
        for _ in 0..4 {
            let handoff = handoff.clone();
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            calls.push(tokio::spawn(async move {
                handoff
                    .sync_to_async(
                        move || {
                            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(10));
                            running.fetch_sub(1, Ordering::SeqCst);
                        },
                        HandoffOptions::exclusive(),
                    )
                    .await
            }));
        }
        for call in calls {
            call.await.expect("join").expect("handoff");
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_context_travels_both_ways() {
        let handoff = ThreadHandoff::default();

        let (inside, after) = with_task_context(Some(ContextId::new("caller")), async {
            let inside = handoff
                .sync_to_async(
                    || {
                        let seen = current_context();
                        switch_context(Some(ContextId::new("worker")));
                        seen
                    },
                    HandoffOptions::default(),
                )
                .await
                .expect("handoff");
            (inside, current_context())
        })
        .await;

        assert_eq!(inside, Some(ContextId::new("caller")));
        assert_eq!(after, Some(ContextId::new("worker")));
    }

    #[tokio::test]
    async fn test_context_not_exchanged_when_disabled() {
        let handoff = ThreadHandoff::default();
        let options = HandoffOptions {
            exclusive: false,
            exchange_context: false,
        };

        let inside = with_task_context(Some(ContextId::new("caller")), async {
            handoff
                .sync_to_async(current_context, options)
                .await
                .expect("handoff")
        })
        .await;

        assert_eq!(inside, None);
    }

    fn isolated() -> HandoffOptions {
        HandoffOptions {
            exclusive: false,
            exchange_context: false,
        }
    }

    #[tokio::test]
    async fn test_worker_context_reset_without_exchange() {
        let handoff = ThreadHandoff::new(1);

        handoff
            .sync_to_async(|| switch_context(Some(ContextId::new("upload-ctx"))), isolated())
            .await
            .expect("handoff");

        let seen = handoff
            .sync_to_async(current_context, isolated())
            .await
            .expect("handoff");
        assert_eq!(seen, None);
    }

    #[tokio::test]
    async fn test_worker_context_reset_after_panic() {
        let handoff = ThreadHandoff::new(1);

        let panicking = handoff.clone();
        let joined = tokio::spawn(async move {
            panicking
                .sync_to_async(
                    || -> u32 {
                        switch_context(Some(ContextId::new("poisoned")));
                        panic!("closure failed");
                    },
                    isolated(),
                )
                .await
        })
        .await;
        assert!(joined.unwrap_err().is_panic());

        let seen = handoff
            .sync_to_async(current_context, isolated())
            .await
            .expect("handoff");
        assert_eq!(seen, None);
        assert_eq!(handoff.available_workers(), 1);
    }

    #[tokio::test]
    async fn test_worker_context_reset_after_exchange() {
        let handoff = ThreadHandoff::new(1);

        with_task_context(Some(ContextId::new("caller")), async {
            handoff
                .sync_to_async(|| (), HandoffOptions::default())
                .await
                .expect("handoff");
        })
        .await;

        let seen = handoff
            .sync_to_async(current_context, isolated())
            .await
            .expect("handoff");
        assert_eq!(seen, None);
    }

    struct Recorder {
        log: Arc<parking_lot::Mutex<Vec<String>>>,
        suppress: bool,
    }

    impl BlockingScope for Recorder {
        type Output = u32;

        fn enter(&mut self) -> Result<u32> {
            self.log.lock().push("enter".into());
            Ok(7)
        }

        fn exit(&mut self, failed: bool) -> bool {
            self.log.lock().push(format!("exit failed={failed}"));
            self.suppress
        }
    }

    #[tokio::test]
    async fn test_scope_success() {
        let handoff = ThreadHandoff::default();
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let scope_log = Arc::clone(&log);

        let value = handoff
            .sync_to_async_scope(
                move || Recorder {
                    log: scope_log,
                    suppress: false,
                },
                |resource| async move { Ok(resource * 6) },
                HandoffOptions::default(),
            )
            .await
            .expect("scope");

        assert_eq!(value, Some(42));
        assert_eq!(*log.lock(), vec!["enter", "exit failed=false"]);
    }

    #[tokio::test]
    async fn test_scope_exit_suppresses_error() {
        let handoff = ThreadHandoff::default();
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let scope_log = Arc::clone(&log);

        let value: Option<u32> = handoff
            .sync_to_async_scope(
                move || Recorder {
                    log: scope_log,
                    suppress: true,
                },
                |_| async { Err(Error::protocol("body failed")) },
                HandoffOptions::default(),
            )
            .await
            .expect("suppressed");

        assert_eq!(value, None);
        assert_eq!(log.lock().last().map(String::as_str), Some("exit failed=true"));
    }

    #[tokio::test]
    async fn test_scope_error_propagates() {
        let handoff = ThreadHandoff::default();
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let err = handoff
            .sync_to_async_scope(
                move || Recorder {
                    log,
                    suppress: false,
                },
                |_| async { Err::<u32, _>(Error::protocol("body failed")) },
                HandoffOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Protocol { .. }));
    }
}
