//! The write half of a live connection, as seen by the hub.
use axum::extract::ws::{self, WebSocket};
use futures_util::{stream::SplitSink, SinkExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{message::Message, queue::QueueError};

pub type ConnId = Uuid;

#[derive(thiserror::Error, Debug)]
pub enum ConnError {
    #[error("connection closed")]
    Closed,

    #[error("write failed: {0}")]
    Send(String),

    #[error("read failed: {0}")]
    Recv(String),

    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("idle for too long")]
    Idle,

    #[error("evicted from the registry")]
    Evicted,

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Outbound side of a connection.
///
/// `close` must be idempotent: registry eviction and handler teardown can both
/// reach it. After `close`, every `send`/`ping` fails with [`ConnError::Closed`].
#[async_trait::async_trait]
pub trait Outbound: Send + Sync {
    async fn send(&self, msg: &Message) -> Result<(), ConnError>;
    async fn ping(&self) -> Result<(), ConnError>;
    async fn close(&self);
}

/// WebSocket sink half. `None` once closed.
pub struct WsOutbound {
    sink: Mutex<Option<SplitSink<WebSocket, ws::Message>>>,
}

impl WsOutbound {
    pub fn new(sink: SplitSink<WebSocket, ws::Message>) -> Self {
        Self { sink: Mutex::new(Some(sink)) }
    }

    async fn write(&self, frame: ws::Message) -> Result<(), ConnError> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(ConnError::Closed)?;
        sink.send(frame).await.map_err(|e| ConnError::Send(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Outbound for WsOutbound {
    async fn send(&self, msg: &Message) -> Result<(), ConnError> {
        self.write(ws::Message::Text(msg.to_json())).await
    }

    async fn ping(&self) -> Result<(), ConnError> {
        self.write(ws::Message::Ping(Vec::new())).await
    }

    async fn close(&self) {
        let Some(mut sink) = self.sink.lock().await.take() else { return };
        // peer may already be gone; nothing left to do either way
        let _ = sink.send(ws::Message::Close(None)).await;
        let _ = sink.close().await;
    }
}
