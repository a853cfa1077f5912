//! Bridge pool: one BiDi socket serving many classic callers.
//!
//! The pool owns the [`Connection`] and a task handler loop. Classic task
//! containers arrive on the ingress queue; each one is handled by its own
//! spawned worker so a slow command never blocks an unrelated one.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ingress    ┌──────────────────────┐   socket   ┌─────────┐
//! │ caller 1..N  │─────────────►│ task handler         │───────────►│         │
//! │ (blocked)    │              │  map → send → map    │            │ browser │
//! │              │◄─────────────│ response dispatcher  │◄───────────│         │
//! └──────────────┘   resolve    └──────────────────────┘   frames   └─────────┘
//! ```
//!
//! # Lifecycle
//!
//! `Idle → Running → Stopping → Idle`. [`BridgePool::start`] is idempotent and
//! [`BridgePool::stop`] on an idle pool does nothing. Stopping resolves every
//! outstanding task with [`Error::BridgeStopped`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, trace, warn};

use crate::bridge::{ClassicTask, ClassicTaskContainer, HandoffOptions, ThreadHandoff};
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::identifiers::{ContextId, TaskIdGenerator};
use crate::mapping::{map_request, map_response, redirect_error_response};
use crate::protocol::{
    ClassicResponse, InternalMethod, ProtocolError, ProtocolReply, ProtocolRequest, ProtocolTask,
};
use crate::transport::Connection;
use crate::upload::unzip_file;

// ============================================================================
// Constants
// ============================================================================

/// Reason reported when the pool is stopped without a specific cause.
pub const DEFAULT_STOP_REASON: &str = "BiDi connection pool stopped";

const NOT_RUNNING_REASON: &str = "bridge is not running";

/// Protocol error reported when no prompt is open in the target context.
const NO_SUCH_ALERT: &str = "no such alert";

// ============================================================================
// PoolState
// ============================================================================

/// Lifecycle state of a [`BridgePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Not connected.
    Idle,
    /// Connected and accepting tasks.
    Running,
    /// Resolving outstanding work before returning to idle.
    Stopping,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Ingress Queue
// ============================================================================

/// Sending half of the pool's ingress queue.
///
/// Bounded when the pool was configured with a buffer size.
#[derive(Debug, Clone)]
pub enum TaskSender {
    /// Queue with back-pressure.
    Bounded(mpsc::Sender<ClassicTaskContainer>),
    /// Queue without a capacity limit.
    Unbounded(mpsc::UnboundedSender<ClassicTaskContainer>),
}

impl TaskSender {
    /// Enqueues from a blocking thread, waiting for capacity if bounded.
    ///
    /// Must not be called from inside an async task.
    ///
    /// # Errors
    ///
    /// [`Error::BridgeStopped`] if the pool is no longer running.
    pub fn blocking_send(&self, container: ClassicTaskContainer) -> Result<()> {
        let sent = match self {
            Self::Bounded(tx) => tx.blocking_send(container).is_ok(),
            Self::Unbounded(tx) => tx.send(container).is_ok(),
        };
        sent.then_some(()).ok_or_else(not_running)
    }

    /// Enqueues from async code.
    ///
    /// # Errors
    ///
    /// [`Error::BridgeStopped`] if the pool is no longer running.
    pub async fn send(&self, container: ClassicTaskContainer) -> Result<()> {
        let sent = match self {
            Self::Bounded(tx) => tx.send(container).await.is_ok(),
            Self::Unbounded(tx) => tx.send(container).is_ok(),
        };
        sent.then_some(()).ok_or_else(not_running)
    }

    /// Returns `true` once the pool stopped accepting tasks.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Bounded(tx) => tx.is_closed(),
            Self::Unbounded(tx) => tx.is_closed(),
        }
    }
}

fn not_running() -> Error {
    Error::bridge_stopped(NOT_RUNNING_REASON)
}

enum TaskReceiver {
    Bounded(mpsc::Receiver<ClassicTaskContainer>),
    Unbounded(mpsc::UnboundedReceiver<ClassicTaskContainer>),
}

impl TaskReceiver {
    async fn recv(&mut self) -> Option<ClassicTaskContainer> {
        match self {
            Self::Bounded(rx) => rx.recv().await,
            Self::Unbounded(rx) => rx.recv().await,
        }
    }

    fn close(&mut self) {
        match self {
            Self::Bounded(rx) => rx.close(),
            Self::Unbounded(rx) => rx.close(),
        }
    }

    fn try_recv(&mut self) -> Option<ClassicTaskContainer> {
        match self {
            Self::Bounded(rx) => rx.try_recv().ok(),
            Self::Unbounded(rx) => rx.try_recv().ok(),
        }
    }
}

fn ingress_channel(buffer_size: Option<usize>) -> (TaskSender, TaskReceiver) {
    match buffer_size {
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity);
            (TaskSender::Bounded(tx), TaskReceiver::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (TaskSender::Unbounded(tx), TaskReceiver::Unbounded(rx))
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// State shared by the task handler's workers.
struct Dispatcher {
    connection: Arc<Connection>,
    ids: Arc<TaskIdGenerator>,
    handoff: ThreadHandoff,
    command_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Runs one classic task and resolves its container.
    ///
    /// Local failures are written into the container, never propagated.
    async fn handle_task(self: Arc<Self>, container: ClassicTaskContainer) {
        if container.is_abandoned() {
            debug!(command = container.task().command(), "Skipping abandoned task");
            return;
        }

        let result = self.execute(container.task()).await;
        if let Err(e) = &result {
            debug!(command = container.task().command(), error = %e, "Task failed");
        }
        container.resolve(result);
    }

    async fn execute(&self, task: &ClassicTask) -> Result<ClassicResponse> {
        let request = map_request(task.command(), task.params(), task.context())?;

        let reply = match request.internal_method() {
            Some(InternalMethod::GetAlertText) => self.alert_text(&request),
            Some(InternalMethod::UploadFile) => self.upload(&request).await?,
            None => {
                let task_id = self.ids.next_id();
                trace!(%task_id, command = task.command(), method = %request.method, "Dispatching task");
                self.connection
                    .send(ProtocolTask::new(task_id, request), self.command_timeout)
                    .await?
            }
        };

        match reply {
            ProtocolReply::Success(result) => map_response(task.command(), &result, task.params()),
            ProtocolReply::Failure(error) => {
                debug!(command = task.command(), error = %error.error, "BiDi error reply");
                redirect_error_response(task.command(), &error)
            }
        }
    }

    /// Answers "get alert text" from the prompt map.
    fn alert_text(&self, request: &ProtocolRequest) -> ProtocolReply {
        let message = request
            .params
            .get("context")
            .and_then(Value::as_str)
            .and_then(|context| self.connection.active_prompt(&ContextId::new(context)));

        match message {
            Some(message) => ProtocolReply::value(Value::from(message)),
            None => ProtocolReply::Failure(ProtocolError::new(NO_SUCH_ALERT, NO_SUCH_ALERT)),
        }
    }

    /// Unpacks an uploaded archive on the blocking pool.
    async fn upload(&self, request: &ProtocolRequest) -> Result<ProtocolReply> {
        let data = request
            .params
            .get("file")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_argument("uploadFile requires 'file'"))?
            .to_string();

        let options = HandoffOptions {
            exclusive: false,
            exchange_context: false,
        };
        let path = self
            .handoff
            .sync_to_async(move || unzip_file(&data), options)
            .await??;

        Ok(ProtocolReply::value(Value::from(path.display().to_string())))
    }
}

/// Consumes the ingress queue until shutdown, one worker per task.
async fn run_task_handler(
    mut ingress: TaskReceiver,
    mut shutdown_rx: oneshot::Receiver<String>,
    dispatcher: Arc<Dispatcher>,
) {
    let mut workers = JoinSet::new();

    let reason = loop {
        tokio::select! {
            reason = &mut shutdown_rx => {
                break reason.unwrap_or_else(|_| DEFAULT_STOP_REASON.to_string());
            }

            container = ingress.recv() => {
                match container {
                    Some(container) => {
                        workers.spawn(Arc::clone(&dispatcher).handle_task(container));
                    }
                    None => break DEFAULT_STOP_REASON.to_string(),
                }
            }

            Some(joined) = workers.join_next(), if !workers.is_empty() => {
                if let Err(e) = joined {
                    warn!(error = %e, "Task worker failed");
                }
            }
        }
    };

    // Tasks still queued never reached the socket.
    ingress.close();
    let mut drained = 0usize;
    while let Some(container) = ingress.try_recv() {
        container.resolve(Err(Error::bridge_stopped(reason.as_str())));
        drained += 1;
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Task worker failed");
        }
    }

    debug!(drained, "Task handler terminated");
}

// ============================================================================
// BridgePool
// ============================================================================

/// Resources of a running pool.
struct RunningPool {
    connection: Arc<Connection>,
    ingress: TaskSender,
    shutdown_tx: oneshot::Sender<String>,
    handler: JoinHandle<()>,
}

/// Owner of the BiDi socket and the task handler loop.
///
/// # Example
///
/// ```ignore
/// let pool = BridgePool::new(BridgeConfig::new("ws://127.0.0.1:9222/session")?);
/// let ingress = pool.start().await?;
/// let remote = BridgeRemoteConnection::new(ingress, legacy);
///
/// // Blocking threads now call remote.execute(...)
///
/// pool.stop().await;
/// ```
pub struct BridgePool {
    config: BridgeConfig,
    ids: Arc<TaskIdGenerator>,
    handoff: ThreadHandoff,
    state: Mutex<PoolState>,
    connection: Mutex<Option<Arc<Connection>>>,
    running: AsyncMutex<Option<RunningPool>>,
}

impl fmt::Debug for BridgePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgePool")
            .field("url", &self.config.websocket_url().as_str())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BridgePool - Lifecycle
// ============================================================================

impl BridgePool {
    /// Creates an idle pool.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        let handoff = ThreadHandoff::new(config.max_workers());
        Self {
            config,
            ids: Arc::new(TaskIdGenerator::new()),
            handoff,
            state: Mutex::new(PoolState::Idle),
            connection: Mutex::new(None),
            running: AsyncMutex::new(None),
        }
    }

    /// Connects and starts the task handler, returning the ingress queue.
    ///
    /// Calling `start` on a running pool returns the existing queue.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the socket does not open in time
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn start(&self) -> Result<TaskSender> {
        let mut running = self.running.lock().await;
        if let Some(current) = running.as_ref() {
            debug!("Bridge pool already running");
            return Ok(current.ingress.clone());
        }

        self.ids.reset();
        let connection = Arc::new(Connection::connect(&self.config).await?);

        let (ingress, receiver) = ingress_channel(self.config.buffer_size());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let dispatcher = Arc::new(Dispatcher {
            connection: Arc::clone(&connection),
            ids: Arc::clone(&self.ids),
            handoff: self.handoff.clone(),
            command_timeout: self.config.command_timeout(),
        });
        let handler = tokio::spawn(run_task_handler(receiver, shutdown_rx, dispatcher));

        *self.connection.lock() = Some(Arc::clone(&connection));
        *running = Some(RunningPool {
            connection,
            ingress: ingress.clone(),
            shutdown_tx,
            handler,
        });
        *self.state.lock() = PoolState::Running;

        info!(url = %self.config.websocket_url(), "Bridge pool started");
        Ok(ingress)
    }

    /// Stops the pool with the default reason.
    pub async fn stop(&self) {
        self.stop_with_reason(DEFAULT_STOP_REASON).await;
    }

    /// Stops the pool, resolving outstanding tasks with `reason`.
    ///
    /// Does nothing on an idle pool.
    pub async fn stop_with_reason(&self, reason: &str) {
        let mut running = self.running.lock().await;
        let Some(current) = running.take() else {
            debug!("Bridge pool already idle");
            return;
        };

        *self.state.lock() = PoolState::Stopping;
        info!(reason, "Bridge pool stopping");

        current.connection.close(reason).await;
        let _ = current.shutdown_tx.send(reason.to_string());
        if let Err(e) = current.handler.await {
            warn!(error = %e, "Task handler ended abnormally");
        }

        *self.connection.lock() = None;
        self.ids.reset();
        *self.state.lock() = PoolState::Idle;

        info!("Bridge pool stopped");
    }
}

// ============================================================================
// BridgePool - Introspection
// ============================================================================

impl BridgePool {
    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> PoolState {
        *self.state.lock()
    }

    /// Configuration the pool was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handoff shared with the pool's upload worker.
    #[inline]
    #[must_use]
    pub fn handoff(&self) -> &ThreadHandoff {
        &self.handoff
    }

    /// Number of protocol tasks awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.connection
            .lock()
            .as_ref()
            .map_or(0, |connection| connection.pending_count())
    }

    /// Message of the prompt open in `context`.
    #[must_use]
    pub fn active_prompt(&self, context: &ContextId) -> Option<String> {
        self.connection
            .lock()
            .as_ref()
            .and_then(|connection| connection.active_prompt(context))
    }

    /// Number of contexts with an open prompt.
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.connection
            .lock()
            .as_ref()
            .map_or(0, |connection| connection.prompt_count())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Cursor, Write};

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as Base64Standard;
    use serde_json::json;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use crate::protocol::ErrorCode;
    use crate::transport::testing::{FakeBrowser, frame_id, init_tracing};

    async fn started(builder: impl FnOnce(&str) -> BridgeConfig) -> (BridgePool, TaskSender, FakeBrowser) {
        init_tracing();
        let mut browser = FakeBrowser::bind().await;
        let pool = BridgePool::new(builder(browser.url().as_str()));
        let (ingress, ()) = tokio::join!(
            async { pool.start().await.expect("start") },
            browser.accept()
        );
        (pool, ingress, browser)
    }

    async fn default_pool() -> (BridgePool, TaskSender, FakeBrowser) {
        started(|url| BridgeConfig::new(url).expect("config")).await
    }

    async fn run(
        ingress: TaskSender,
        command: &str,
        params: Value,
        context: Option<&str>,
    ) -> Result<ClassicResponse> {
        let task = ClassicTask::new(command, params, context.map(ContextId::new));
        let (container, receiver) = ClassicTaskContainer::new(task);
        ingress.send(container).await?;
        receiver.wait_async().await
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        tokio_test::assert_ok!(waited);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (pool, _ingress, _browser) = default_pool().await;
        assert_eq!(pool.state(), PoolState::Running);

        let again = pool.start().await.expect("second start");
        assert!(!again.is_closed());
        assert_eq!(pool.state(), PoolState::Running);

        pool.stop().await;
        assert_eq!(pool.state(), PoolState::Idle);
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let pool = BridgePool::new(BridgeConfig::new("ws://127.0.0.1:9/").expect("config"));
        pool.stop().await;
        assert_eq!(pool.state(), PoolState::Idle);
        assert_eq!(pool.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_navigate_round_trip() {
        let (pool, ingress, mut browser) = default_pool().await;

        let call = tokio::spawn(run(
            ingress,
            "get",
            json!({"url": "https://example.com"}),
            Some("ctx-1"),
        ));

        let frame = browser.recv().await;
        assert_eq!(frame_id(&frame), 1);
        assert_eq!(frame["method"], "browsingContext.navigate");
        assert_eq!(frame["params"]["context"], "ctx-1");
        browser.reply(1, json!({"navigation": "n1", "url": "https://example.com"})).await;

        let response = call.await.expect("join").expect("response");
        assert_eq!(response.to_json(), json!({"value": null}));
        assert_eq!(pool.pending_count(), 0);

        pool.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_get_their_own_reply() {
        const CALLERS: usize = 16;
        let (pool, ingress, mut browser) = default_pool().await;

        let calls: Vec<_> = (0..CALLERS)
            .map(|i| {
                let context = format!("ctx-{i}");
                let ingress = ingress.clone();
                tokio::spawn(async move {
                    let response = run(ingress, "getCurrentUrl", json!({}), Some(&context)).await;
                    (context, response)
                })
            })
            .collect();

        let mut frames = Vec::with_capacity(CALLERS);
        for _ in 0..CALLERS {
            frames.push(browser.recv().await);
        }
        let mut ids: Vec<u64> = frames.iter().map(frame_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CALLERS);

        for frame in frames.iter().rev() {
            let root = frame["params"]["root"].as_str().expect("root").to_string();
            browser
                .reply(
                    frame_id(frame),
                    json!({"contexts": [{"context": root, "url": format!("https://{root}/")}]}),
                )
                .await;
        }

        for call in calls {
            let (context, response) = call.await.expect("join");
            let response = response.expect("response");
            assert_eq!(
                response.success_value(),
                Some(&json!(format!("https://{context}/")))
            );
        }

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_stop_resolves_pending_tasks() {
        const PENDING: usize = 3;
        let (pool, ingress, mut browser) = default_pool().await;

        let calls: Vec<_> = (0..PENDING)
            .map(|_| {
                tokio::spawn(run(
                    ingress.clone(),
                    "get",
                    json!({"url": "https://slow.example"}),
                    Some("ctx-1"),
                ))
            })
            .collect();

        for _ in 0..PENDING {
            browser.recv().await;
        }
        wait_until(|| pool.pending_count() == PENDING).await;

        pool.stop_with_reason("test stop").await;

        for call in calls {
            let err = call.await.expect("join").unwrap_err();
            assert_eq!(err.to_string(), "BiDi bridge was stopped. Reason: test stop");
        }
        assert_eq!(pool.pending_count(), 0);
        assert_eq!(pool.prompt_count(), 0);
        assert_eq!(pool.state(), PoolState::Idle);

        let err = run(ingress, "get", json!({"url": "x"}), None).await.unwrap_err();
        assert!(err.is_bridge_error());
    }

    #[tokio::test]
    async fn test_restart_resets_task_ids() {
        let (pool, ingress, mut browser) = default_pool().await;

        let call = tokio::spawn(run(ingress, "refresh", json!({}), Some("ctx-1")));
        assert_eq!(frame_id(&browser.recv().await), 1);
        browser.reply(1, json!({})).await;
        call.await.expect("join").expect("response");

        pool.stop().await;

        let (ingress, ()) = tokio::join!(
            async { pool.start().await.expect("restart") },
            browser.accept()
        );
        let call = tokio::spawn(run(ingress, "refresh", json!({}), Some("ctx-1")));
        assert_eq!(frame_id(&browser.recv().await), 1);
        browser.reply(1, json!({})).await;
        call.await.expect("join").expect("response");

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_prompt_lifecycle() {
        let (pool, ingress, mut browser) = default_pool().await;
        let context = ContextId::new("C");

        browser
            .event(
                "browsingContext.userPromptOpened",
                json!({"context": "C", "type": "alert", "message": "hi"}),
            )
            .await;
        wait_until(|| pool.active_prompt(&context).is_some()).await;

        let response = run(ingress.clone(), "w3cGetAlertText", json!({}), Some("C"))
            .await
            .expect("response");
        assert_eq!(response.to_json(), json!({"value": "hi"}));

        browser
            .event(
                "browsingContext.userPromptClosed",
                json!({"context": "C", "accepted": true}),
            )
            .await;
        wait_until(|| pool.prompt_count() == 0).await;

        let response = run(ingress, "w3cGetAlertText", json!({}), Some("C"))
            .await
            .expect("response");
        let error = response.as_error().expect("error response");
        assert_eq!(error.code, ErrorCode::NoAlertOpen);
        assert_eq!(error.code.as_str(), "no such alert");

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_unmapped_command_never_reaches_socket() {
        let (pool, ingress, mut browser) = default_pool().await;

        let err = run(ingress, "foo.bar", json!({}), Some("ctx-1")).await.unwrap_err();
        assert!(matches!(err, Error::CommandNotMapped { .. }));

        let nothing = tokio::time::timeout(Duration::from_millis(50), browser.recv()).await;
        assert!(nothing.is_err());
        assert_eq!(pool.pending_count(), 0);

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_error_redirects_end_to_end() {
        let (pool, ingress, mut browser) = default_pool().await;

        let call = tokio::spawn(run(ingress.clone(), "getTitle", json!({}), Some("ctx-1")));
        let id = frame_id(&browser.recv().await);
        browser.error(id, "no such frame", "context discarded").await;
        let response = call.await.expect("join").expect("response");
        assert_eq!(
            response.as_error().map(|error| error.code),
            Some(ErrorCode::NoSuchWindow)
        );

        let call = tokio::spawn(run(ingress.clone(), "w3cAcceptAlert", json!({}), Some("ctx-1")));
        let id = frame_id(&browser.recv().await);
        browser.error(id, "invalid argument", "no such alert").await;
        let response = call.await.expect("join").expect("response");
        assert_eq!(
            response.as_error().map(|error| error.code),
            Some(ErrorCode::NoAlertOpen)
        );

        let call = tokio::spawn(run(ingress.clone(), "clickElement", json!({"id": "n1"}), Some("ctx-1")));
        let id = frame_id(&browser.recv().await);
        browser
            .reply(
                id,
                json!({
                    "type": "exception",
                    "exceptionDetails": {
                        "text": "Error: stale element reference",
                        "stackTrace": {"callFrames": []},
                    },
                }),
            )
            .await;
        let response = call.await.expect("join").expect("response");
        let error = response.as_error().expect("error response");
        assert_eq!(error.code, ErrorCode::StaleElementReference);
        assert_eq!(error.status(), 10);

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_bidi_error_is_execution_error() {
        let (pool, ingress, mut browser) = default_pool().await;

        let call = tokio::spawn(run(ingress, "refresh", json!({}), Some("ctx-1")));
        let id = frame_id(&browser.recv().await);
        browser.error(id, "something new", "details").await;

        let err = call.await.expect("join").unwrap_err();
        assert_eq!(err.to_string(), "BiDi: something new - details");

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_upload_is_answered_locally() {
        let (pool, ingress, mut browser) = default_pool().await;

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("upload.txt", SimpleFileOptions::default())
            .expect("start file");
        writer.write_all(b"payload").expect("write");
        let data = Base64Standard.encode(writer.finish().expect("finish").into_inner());

        let response = run(ingress, "uploadFile", json!({"file": data}), Some("ctx-1"))
            .await
            .expect("response");
        let path = response
            .success_value()
            .and_then(Value::as_str)
            .expect("path")
            .to_string();
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "payload");

        let nothing = tokio::time::timeout(Duration::from_millis(50), browser.recv()).await;
        assert!(nothing.is_err());

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let (pool, ingress, mut browser) = started(|url| {
            BridgeConfig::builder()
                .websocket_url(url)
                .command_timeout(Duration::from_millis(50))
                .build()
                .expect("config")
        })
        .await;

        let call = tokio::spawn(run(ingress, "refresh", json!({}), Some("ctx-1")));
        browser.recv().await;

        let err = call.await.expect("join").unwrap_err();
        assert!(err.is_timeout());

        pool.stop().await;
    }

    #[tokio::test]
    async fn test_bounded_ingress() {
        let (pool, ingress, mut browser) = started(|url| {
            BridgeConfig::builder()
                .websocket_url(url)
                .buffer_size(4)
                .build()
                .expect("config")
        })
        .await;
        assert!(matches!(ingress, TaskSender::Bounded(_)));

        let call = tokio::spawn(run(ingress, "goBack", json!({}), Some("ctx-1")));
        let frame = browser.recv().await;
        assert_eq!(frame["params"], json!({"context": "ctx-1", "delta": -1}));
        browser.reply(frame_id(&frame), json!({})).await;
        call.await.expect("join").expect("response");

        pool.stop().await;
    }
}
