//! Set of connections currently eligible for fan-out.
use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, Notify};

use super::conn::{ConnId, Outbound};

/// Shared registry handle. Cloning shares the same set.
///
/// Every mutation and every snapshot goes through one mutex; the lock is
/// never held across a socket write.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<Mutex<HashMap<ConnId, Entry>>>,
}

struct Entry {
    conn:    Arc<dyn Outbound>,
    evicted: Arc<Notify>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. An id that is already present keeps its first entry.
    ///
    /// The returned signal fires once the connection is deregistered, by
    /// whoever gets there first; the reader stops on it.
    pub async fn register(&self, id: ConnId, conn: Arc<dyn Outbound>) -> Arc<Notify> {
        let (evicted, live) = {
            let mut m = self.inner.lock().await;
            let e = m.entry(id).or_insert_with(|| Entry { conn, evicted: Arc::new(Notify::new()) });
            (Arc::clone(&e.evicted), m.len())
        };
        tracing::info!(conn_id = %id, live, "connection registered");
        evicted
    }

    /// Remove and close a connection. Absent ids are ignored, so racing
    /// callers close the transport exactly once. Returns whether this call
    /// did the removal.
    pub async fn deregister(&self, id: ConnId) -> bool {
        let (removed, live) = {
            let mut m = self.inner.lock().await;
            (m.remove(&id), m.len())
        };
        match removed {
            Some(Entry { conn, evicted }) => {
                // stored as a permit if the reader isn't waiting yet
                evicted.notify_one();
                conn.close().await;
                tracing::info!(conn_id = %id, live, "connection deregistered");
                true
            }
            None => false,
        }
    }

    /// Consistent copy of the current membership.
    pub async fn snapshot(&self) -> Vec<(ConnId, Arc<dyn Outbound>)> {
        self.inner
            .lock()
            .await
            .iter()
            .map(|(id, e)| (*id, Arc::clone(&e.conn)))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn contains(&self, id: ConnId) -> bool {
        self.inner.lock().await.contains_key(&id)
    }
}
