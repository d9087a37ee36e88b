//! Periodic pings so dead peers surface as write failures.
use std::time::Duration;

use super::registry::Registry;

pub async fn task(registry: Registry, every: Duration) {
    let mut tick = tokio::time::interval(every);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tick.tick().await; // first tick is immediate
    loop {
        tick.tick().await;
        sweep(&registry).await;
    }
}

/// Ping every registered connection once; evict those that fail.
pub async fn sweep(registry: &Registry) -> usize {
    let mut evicted = 0;
    for (id, conn) in registry.snapshot().await {
        if let Err(e) = conn.ping().await {
            tracing::warn!(conn_id = %id, error = %e, "ping failed, evicting");
            if registry.deregister(id).await {
                evicted += 1;
            }
        }
    }
    evicted
}
