//! Periodic pool maintenance.

use crate::TransactionPool;
use corvid_tasks::TaskExecutor;
use futures_util::FutureExt;
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// Spawns the background task that periodically drops aged-out transactions.
///
/// The shutdown signal is checked before every pass and the task also ends
/// when the executor's [`TaskManager`](corvid_tasks::TaskManager) shuts
/// down; an in-flight eviction pass is never interrupted.
pub fn spawn_eviction_task(
    pool: Arc<TransactionPool>,
    executor: &TaskExecutor,
    period: Duration,
) {
    let shutdown = executor.on_shutdown();
    executor.spawn(Box::pin(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if shutdown.clone().now_or_never().is_some() {
                return
            }
            let dropped = pool.evict_old_transactions();
            if !dropped.is_empty() {
                debug!(target: "txpool", count = dropped.len(), "dropped aged-out transactions");
            }
        }
    }));
}
