//! In-process fake BiDi endpoint for tests.

use std::net::Ipv4Addr;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber once; later calls are no-ops.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A WebSocket server that plays the browser side of the BiDi socket.
pub(crate) struct FakeBrowser {
    listener: TcpListener,
    socket: Option<WebSocketStream<TcpStream>>,
}

impl FakeBrowser {
    pub(crate) async fn bind() -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind should succeed");
        Self {
            listener,
            socket: None,
        }
    }

    pub(crate) fn url(&self) -> String {
        let port = self.listener.local_addr().expect("local addr").port();
        format!("ws://127.0.0.1:{port}")
    }

    /// Accepts the next client, replacing any previous one.
    pub(crate) async fn accept(&mut self) {
        let (stream, _) = self.listener.accept().await.expect("accept");
        self.socket = Some(accept_async(stream).await.expect("upgrade"));
    }

    fn socket(&mut self) -> &mut WebSocketStream<TcpStream> {
        self.socket.as_mut().expect("client accepted")
    }

    /// Next text frame from the client, as JSON.
    pub(crate) async fn recv(&mut self) -> Value {
        loop {
            let message = self
                .socket()
                .next()
                .await
                .expect("socket open")
                .expect("valid frame");
            if let Message::Text(text) = message {
                return serde_json::from_str(&text).expect("json frame");
            }
        }
    }

    pub(crate) async fn send(&mut self, frame: Value) {
        self.socket()
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("send frame");
    }

    pub(crate) async fn reply(&mut self, id: u64, result: Value) {
        self.send(json!({"id": id, "result": result})).await;
    }

    pub(crate) async fn error(&mut self, id: u64, error: &str, message: &str) {
        self.send(json!({"id": id, "error": error, "message": message, "stacktrace": ""}))
            .await;
    }

    pub(crate) async fn event(&mut self, method: &str, params: Value) {
        self.send(json!({"type": "event", "method": method, "params": params}))
            .await;
    }

    pub(crate) async fn close(&mut self) {
        let _ = self.socket().close(None).await;
    }
}

/// Id of a received task frame.
pub(crate) fn frame_id(frame: &Value) -> u64 {
    frame["id"].as_u64().expect("task id")
}
