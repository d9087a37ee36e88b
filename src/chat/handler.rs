//! Per-connection reader: register, read frames, feed the queue, deregister.
use std::{fmt::Display, sync::Arc, time::Duration};

use axum::extract::ws;
use futures_util::{Stream, StreamExt};
use tokio::sync::Notify;

use super::{
    conn::{ConnError, ConnId, Outbound},
    message::Message,
    queue::{Queue, QueueError},
    registry::Registry,
};

pub struct Handler {
    pub id:           ConnId,
    pub username:     String,
    pub registry:     Registry,
    pub queue:        Queue,
    pub idle_timeout: Option<Duration>,
}

impl Handler {
    /// Own one connection for its whole life. `outbound` goes into the
    /// registry for the hub; this task only ever reads `inbound`.
    pub async fn run<S, E>(self, outbound: Arc<dyn Outbound>, inbound: S)
    where
        S: Stream<Item = Result<ws::Message, E>> + Unpin,
        E: Display,
    {
        let evicted = self.registry.register(self.id, outbound).await;

        match self.read_loop(inbound, &evicted).await {
            Ok(()) => tracing::info!(conn_id = %self.id, username = %self.username, "client left"),
            Err(ConnError::Idle) => {
                tracing::info!(conn_id = %self.id, username = %self.username, "idle timeout")
            }
            Err(ConnError::Evicted) => {
                tracing::info!(conn_id = %self.id, username = %self.username, "evicted, reader stopping")
            }
            Err(e) => {
                tracing::warn!(conn_id = %self.id, username = %self.username, error = %e, "read failed")
            }
        }

        // the hub may have got here first
        self.registry.deregister(self.id).await;
    }

    async fn read_loop<S, E>(&self, mut inbound: S, evicted: &Notify) -> Result<(), ConnError>
    where
        S: Stream<Item = Result<ws::Message, E>> + Unpin,
        E: Display,
    {
        loop {
            let read = async {
                match self.idle_timeout {
                    Some(d) => tokio::time::timeout(d, inbound.next())
                        .await
                        .map_err(|_| ConnError::Idle),
                    None => Ok(inbound.next().await),
                }
            };
            // eviction wins over any frame already waiting
            let next = tokio::select! {
                biased;
                _ = evicted.notified() => return Err(ConnError::Evicted),
                r = read => r?,
            };

            let raw = match next {
                None => return Ok(()),
                Some(Err(e)) => return Err(ConnError::Recv(e.to_string())),
                Some(Ok(ws::Message::Close(_))) => return Ok(()),
                Some(Ok(ws::Message::Ping(_) | ws::Message::Pong(_))) => continue,
                Some(Ok(ws::Message::Text(t))) => t.into_bytes(),
                Some(Ok(ws::Message::Binary(b))) => b,
            };

            let msg = Message::from_client(&raw, &self.username)?;
            match self.queue.enqueue(msg).await {
                Ok(()) => {}
                Err(QueueError::Full) => {
                    tracing::warn!(conn_id = %self.id, username = %self.username, "queue full, message dropped")
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
