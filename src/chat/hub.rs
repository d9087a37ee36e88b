//! The single consumer of the broadcast queue: persist, then fan out.
use std::sync::Arc;

use super::{message::Message, queue::QueueRx, registry::Registry, store::MessageStore};

#[derive(Clone)]
pub struct Hub {
    registry: Registry,
    store:    Arc<dyn MessageStore>,
}

impl Hub {
    pub fn new(registry: Registry, store: Arc<dyn MessageStore>) -> Self {
        Self { registry, store }
    }

    /// Drain the queue until every producer is gone, which only happens at
    /// process teardown.
    pub async fn run(self, mut rx: QueueRx) {
        tracing::info!("broadcast hub started");
        while let Some(msg) = rx.recv().await {
            self.dispatch(&msg).await;
        }
        tracing::info!("broadcast hub stopped");
    }

    /// Persist `msg`, then write it once to every registered connection.
    /// Connections that fail the write are evicted. Returns how many
    /// writes succeeded.
    pub async fn dispatch(&self, msg: &Message) -> usize {
        tracing::debug!(username = %msg.username, timestamp = msg.timestamp, "dispatching");

        // delivery does not wait on the log
        if let Err(e) = self.store.insert(msg).await {
            tracing::error!(error = %e, username = %msg.username, "message not persisted");
        }

        let mut delivered = 0;
        for (id, conn) in self.registry.snapshot().await {
            match conn.send(msg).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(conn_id = %id, error = %e, "write failed, evicting");
                    self.registry.deregister(id).await;
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use uuid::Uuid;

    use super::*;
    use crate::chat::{
        conn::testing::MemConn,
        queue::{self, Overflow},
        store::testing::MemStore,
    };

    async fn with_conns(n: usize) -> (Registry, Vec<(Uuid, Arc<MemConn>)>) {
        let reg = Registry::new();
        let mut conns = Vec::new();
        for _ in 0..n {
            let id = Uuid::new_v4();
            let c = Arc::new(MemConn::default());
            reg.register(id, c.clone()).await;
            conns.push((id, c));
        }
        (reg, conns)
    }

    #[tokio::test]
    async fn every_connection_gets_one_copy_and_store_one_row() {
        let (reg, conns) = with_conns(2).await;
        let store = Arc::new(MemStore::default());
        let hub = Hub::new(reg, store.clone());

        let m = Message::new("alice", "hi", 1000);
        assert_eq!(hub.dispatch(&m).await, 2);

        for (_, c) in &conns {
            assert_eq!(c.received(), vec![m.clone()]);
        }
        assert_eq!(store.rows(), vec![m]);
    }

    #[tokio::test]
    async fn broken_connection_is_evicted_others_still_served() {
        let (reg, conns) = with_conns(3).await;
        let hub = Hub::new(reg.clone(), Arc::new(MemStore::default()));
        let (a, b, c) = (&conns[0], &conns[1], &conns[2]);

        let first = Message::new("alice", "one", 1);
        hub.dispatch(&first).await;

        b.1.break_transport();
        let second = Message::new("alice", "two", 2);
        assert_eq!(hub.dispatch(&second).await, 2);

        assert!(!reg.contains(b.0).await);
        assert_eq!(b.1.closes.load(Ordering::SeqCst), 1);
        // earlier delivery stands
        assert_eq!(b.1.received(), vec![first.clone()]);
        assert_eq!(a.1.received(), vec![first.clone(), second.clone()]);
        assert_eq!(c.1.received(), vec![first, second]);

        // evicted connection sees nothing further, even if its pipe recovers
        b.1.restore();
        assert_eq!(hub.dispatch(&Message::new("alice", "three", 3)).await, 2);
        assert_eq!(b.1.received().len(), 1);
        assert_eq!(a.1.received().len(), 3);
    }

    #[tokio::test]
    async fn persistence_failure_does_not_block_delivery() {
        let (reg, conns) = with_conns(2).await;
        let store = Arc::new(MemStore::failing_on(&["lost"]));
        let hub = Hub::new(reg, store.clone());

        let (tx, rx) = queue::channel(8, Overflow::Block);
        let lost = Message::new("alice", "lost", 1);
        let kept = Message::new("alice", "kept", 2);
        tx.enqueue(lost.clone()).await.unwrap();
        tx.enqueue(kept.clone()).await.unwrap();
        drop(tx);
        hub.run(rx).await;

        assert_eq!(store.failures.load(Ordering::SeqCst), 1);
        assert_eq!(store.rows(), vec![kept.clone()]);
        for (_, c) in &conns {
            assert_eq!(c.received(), vec![lost.clone(), kept.clone()]);
        }
    }

    #[tokio::test]
    async fn empty_registry_still_persists() {
        let store = Arc::new(MemStore::default());
        let hub = Hub::new(Registry::new(), store.clone());
        assert_eq!(hub.dispatch(&Message::new("a", "b", 1)).await, 0);
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn hundred_producers_hundred_rows() {
        let (reg, conns) = with_conns(100).await;
        let store = Arc::new(MemStore::default());
        let (tx, rx) = queue::channel(16, Overflow::Block);
        let hub = tokio::spawn(Hub::new(reg, store.clone()).run(rx));

        let producers: Vec<_> = (0..100)
            .map(|n| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tx.enqueue(Message::new(format!("user{n}"), format!("msg{n}"), n)).await
                })
            })
            .collect();
        for p in producers {
            p.await.unwrap().unwrap();
        }
        drop(tx);
        hub.await.unwrap();

        let mut rows = store.rows();
        assert_eq!(rows.len(), 100);
        rows.sort_by_key(|m| m.timestamp);
        rows.dedup();
        assert_eq!(rows.len(), 100);
        for (_, c) in &conns {
            assert_eq!(c.received().len(), 100);
        }
    }
}
