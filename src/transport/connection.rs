//! WebSocket connection and response dispatcher.
//!
//! This module owns the BiDi socket. A spawned event loop writes outbound
//! protocol tasks and reads inbound frames:
//!
//! - replies are matched to their waiting task by correlation id
//! - user prompt events update the active prompt map
//! - anything else is logged and dropped
//!
//! When the loop ends, every task still in the correlation table is resolved
//! with [`Error::BridgeStopped`], so no waiter outlives the socket.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::to_string;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};

use crate::bridge::ProtocolTaskContainer;
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::identifiers::{ContextId, TaskId};
use crate::protocol::{InboundFrame, ProtocolReply, ProtocolTask, PromptEvent};

// ============================================================================
// Constants
// ============================================================================

/// Reason reported to pending tasks when the socket goes away on its own.
pub const CONNECTION_CLOSED_REASON: &str = "BiDi connection closed";

// ============================================================================
// Types
// ============================================================================

type BidiStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map of task ids to reply channels.
type CorrelationMap = FxHashMap<TaskId, oneshot::Sender<Result<ProtocolReply>>>;

/// Map of browsing contexts to the message of their open prompt.
type PromptMap = FxHashMap<ContextId, String>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Register a task and write it to the socket.
    Send(ProtocolTaskContainer),
    /// Remove a timed-out correlation entry.
    RemoveCorrelation(TaskId),
    /// Resolve pending tasks with `reason` and close the socket.
    Shutdown { reason: String },
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to the browser's BiDi endpoint.
///
/// Handles request/response correlation and prompt tracking. The
/// connection spawns an internal event loop task.
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
    /// Active prompts (shared with event loop).
    prompts: Arc<Mutex<PromptMap>>,
    /// Event loop task, taken on close.
    event_loop: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending_count())
            .field("prompts", &self.prompt_count())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Opens the socket described by `config` and starts the event loop.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake exceeds the connect timeout
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(config: &BridgeConfig) -> Result<Self> {
        let url = config.websocket_url().as_str();
        let connect_timeout = config.connect_timeout();

        let (ws_stream, _) = timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| Error::connection_timeout(connect_timeout.as_millis() as u64))??;

        info!(%url, "BiDi connection established");
        Ok(Self::new(ws_stream))
    }

    /// Creates a connection from an open WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn new(ws_stream: BidiStream) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));
        let prompts = Arc::new(Mutex::new(PromptMap::default()));

        let event_loop = tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
            Arc::clone(&prompts),
        ));

        Self {
            command_tx,
            correlation,
            prompts,
            event_loop: Mutex::new(Some(event_loop)),
        }
    }

    /// Sends a task and waits for its reply.
    ///
    /// `request_timeout` of `None` waits until the reply arrives or the
    /// connection shuts down.
    ///
    /// # Errors
    ///
    /// - [`Error::BridgeStopped`] if the connection is closed or shuts down
    /// - [`Error::RequestTimeout`] if the reply does not arrive in time
    pub async fn send(
        &self,
        task: ProtocolTask,
        request_timeout: Option<Duration>,
    ) -> Result<ProtocolReply> {
        let task_id = task.id;
        let (container, reply_rx) = ProtocolTaskContainer::new(task);

        self.command_tx
            .send(ConnectionCommand::Send(container))
            .map_err(|_| Error::bridge_stopped(CONNECTION_CLOSED_REASON))?;

        let Some(request_timeout) = request_timeout else {
            return reply_rx
                .await
                .map_err(|_| Error::bridge_stopped(CONNECTION_CLOSED_REASON))?;
        };

        match timeout(request_timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::bridge_stopped(CONNECTION_CLOSED_REASON)),
            Err(_) => {
                // Timeout - clean up correlation entry
                let _ = self
                    .command_tx
                    .send(ConnectionCommand::RemoveCorrelation(task_id));

                Err(Error::request_timeout(
                    task_id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Returns the number of tasks awaiting a reply.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Returns the message of the prompt open in `context`.
    #[must_use]
    pub fn active_prompt(&self, context: &ContextId) -> Option<String> {
        self.prompts.lock().get(context).cloned()
    }

    /// Returns the number of contexts with an open prompt.
    #[inline]
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Returns `true` while the event loop is running.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Resolves pending tasks with `reason`, closes the socket and waits for
    /// the event loop to finish. Prompt state is cleared.
    pub async fn close(&self, reason: &str) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown {
            reason: reason.to_string(),
        });

        let event_loop = self.event_loop.lock().take();
        if let Some(handle) = event_loop
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Event loop ended abnormally");
        }

        // The loop may have ended on its own before the shutdown arrived.
        Self::fail_pending_requests(&self.correlation, reason);
        self.prompts.lock().clear();
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: BidiStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
        prompts: Arc<Mutex<PromptMap>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();
        let mut reason = CONNECTION_CLOSED_REASON.to_string();

        loop {
            tokio::select! {
                // Incoming frames from the browser
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &correlation, &prompts);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the pool
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(container)) => {
                            Self::handle_send_command(container, &mut ws_write, &correlation).await;
                        }

                        Some(ConnectionCommand::RemoveCorrelation(task_id)) => {
                            correlation.lock().remove(&task_id);
                            debug!(%task_id, "Removed timed-out correlation");
                        }

                        Some(ConnectionCommand::Shutdown { reason: shutdown_reason }) => {
                            debug!(reason = %shutdown_reason, "Shutdown command received");
                            reason = shutdown_reason;
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Later sends fail fast instead of queueing behind a dead loop.
        command_rx.close();
        while let Ok(command) = command_rx.try_recv() {
            if let ConnectionCommand::Send(container) = command {
                let (_, responder) = container.into_parts();
                let _ = responder.send(Err(Error::bridge_stopped(reason.as_str())));
            }
        }

        Self::fail_pending_requests(&correlation, &reason);

        debug!("Event loop terminated");
    }

    /// Handles an incoming text frame from the browser.
    fn handle_incoming_message(
        text: &str,
        correlation: &Arc<Mutex<CorrelationMap>>,
        prompts: &Arc<Mutex<PromptMap>>,
    ) {
        let frame = match InboundFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, text = %text, "Failed to parse incoming frame");
                return;
            }
        };

        match frame {
            InboundFrame::Reply { id, reply } => {
                let tx = correlation.lock().remove(&id);

                if let Some(tx) = tx {
                    trace!(%id, failure = reply.is_failure(), "Reply received");
                    let _ = tx.send(Ok(reply));
                } else {
                    warn!(%id, "Reply for unknown task");
                }
            }

            InboundFrame::OrphanError(err) => {
                warn!(error = %err.error, message = %err.message, "Error frame without task id");
            }

            InboundFrame::Event(event) => match event.as_prompt_event() {
                Some(PromptEvent::Opened { context, message }) => {
                    debug!(%context, "User prompt opened");
                    prompts.lock().insert(context, message);
                }
                Some(PromptEvent::Closed { context }) => {
                    debug!(%context, "User prompt closed");
                    prompts.lock().remove(&context);
                }
                None => {
                    trace!(method = %event.method, "Dropped unhandled event");
                }
            },
        }
    }

    /// Handles a send command from the pool.
    async fn handle_send_command(
        container: ProtocolTaskContainer,
        ws_write: &mut futures_util::stream::SplitSink<BidiStream, Message>,
        correlation: &Arc<Mutex<CorrelationMap>>,
    ) {
        let (task, responder) = container.into_parts();
        let task_id = task.id;

        // Serialize task
        let json = match to_string(&task) {
            Ok(j) => j,
            Err(e) => {
                let _ = responder.send(Err(Error::Json(e)));
                return;
            }
        };

        // Store correlation before sending
        correlation.lock().insert(task_id, responder);

        // Send over WebSocket
        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            // Remove correlation and notify caller
            if let Some(tx) = correlation.lock().remove(&task_id) {
                let _ = tx.send(Err(Error::connection(e.to_string())));
            }
            return;
        }

        trace!(%task_id, method = %task.method, "Task sent");
    }

    /// Fails all pending tasks with a bridge stopped error.
    fn fail_pending_requests(correlation: &Arc<Mutex<CorrelationMap>>, reason: &str) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::bridge_stopped(reason)));
        }

        if count > 0 {
            debug!(count, reason, "Failed pending tasks on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::{ProtocolError, ProtocolRequest};
    use crate::transport::testing::{FakeBrowser, init_tracing};

    async fn connected() -> (Connection, FakeBrowser) {
        init_tracing();
        let mut browser = FakeBrowser::bind().await;
        let config = BridgeConfig::new(browser.url()).expect("config");
        let (connection, ()) = tokio::join!(
            async { Connection::connect(&config).await.expect("connect") },
            browser.accept()
        );
        (connection, browser)
    }

    fn task(id: u64, method: &str) -> ProtocolTask {
        ProtocolTask::new(TaskId::new(id), ProtocolRequest::new(method, json!({})))
    }

    #[tokio::test]
    async fn test_reply_is_correlated() {
        let (connection, mut browser) = connected().await;

        let (reply, ()) = tokio::join!(connection.send(task(1, "session.status"), None), async {
            let frame = browser.recv().await;
            assert_eq!(frame["id"], 1);
            assert_eq!(frame["method"], "session.status");
            browser.reply(1, json!({"ready": true})).await;
        });

        assert_eq!(reply.expect("reply"), ProtocolReply::Success(json!({"ready": true})));
        assert_eq!(connection.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_error_reply() {
        let (connection, mut browser) = connected().await;

        let (reply, ()) = tokio::join!(connection.send(task(4, "script.evaluate"), None), async {
            browser.recv().await;
            browser.error(4, "no such frame", "gone").await;
        });

        assert_eq!(
            reply.expect("reply"),
            ProtocolReply::Failure(ProtocolError::new("no such frame", "gone"))
        );
    }

    #[tokio::test]
    async fn test_prompt_events_tracked() {
        let (connection, mut browser) = connected().await;
        let context = ContextId::new("ctx-1");

        browser
            .event(
                "browsingContext.userPromptOpened",
                json!({"context": "ctx-1", "type": "alert", "message": "hi"}),
            )
            .await;
        tokio_test::assert_ok!(
            tokio::time::timeout(Duration::from_secs(5), async {
                while connection.active_prompt(&context).is_none() {
                    tokio::task::yield_now().await;
                }
            })
            .await
        );
        assert_eq!(connection.active_prompt(&context).as_deref(), Some("hi"));

        browser
            .event(
                "browsingContext.userPromptClosed",
                json!({"context": "ctx-1", "accepted": true}),
            )
            .await;
        tokio_test::assert_ok!(
            tokio::time::timeout(Duration::from_secs(5), async {
                while connection.prompt_count() > 0 {
                    tokio::task::yield_now().await;
                }
            })
            .await
        );
    }

    #[tokio::test]
    async fn test_timeout_removes_correlation() {
        let (connection, mut browser) = connected().await;

        let (reply, _) = tokio::join!(
            connection.send(task(9, "script.evaluate"), Some(Duration::from_millis(50))),
            browser.recv()
        );

        let err = reply.unwrap_err();
        assert!(err.is_timeout());

        tokio_test::assert_ok!(
            tokio::time::timeout(Duration::from_secs(5), async {
                while connection.pending_count() > 0 {
                    tokio::task::yield_now().await;
                }
            })
            .await
        );
    }

    #[tokio::test]
    async fn test_close_fails_pending_with_reason() {
        let (connection, mut browser) = connected().await;
        let connection = Arc::new(connection);

        let sender = Arc::clone(&connection);
        let pending = tokio::spawn(async move { sender.send(task(2, "script.evaluate"), None).await });
        browser.recv().await;

        connection.close("test shutdown").await;

        let err = pending.await.expect("join").unwrap_err();
        assert_eq!(err.to_string(), "BiDi bridge was stopped. Reason: test shutdown");
        assert_eq!(connection.pending_count(), 0);
        assert!(!connection.is_open());
    }

    #[tokio::test]
    async fn test_socket_loss_fails_pending() {
        let (connection, mut browser) = connected().await;
        let connection = Arc::new(connection);

        let sender = Arc::clone(&connection);
        let pending = tokio::spawn(async move { sender.send(task(5, "script.evaluate"), None).await });
        browser.recv().await;
        browser.close().await;

        let err = pending.await.expect("join").unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("BiDi bridge was stopped. Reason: {CONNECTION_CLOSED_REASON}")
        );
    }
}
