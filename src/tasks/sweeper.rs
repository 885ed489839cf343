//! Eviction Sweep Task
//!
//! Background task that periodically removes idle documents from the cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use crate::cache::DocumentCache;

/// Spawns a background task that sweeps the cache once per `interval`.
///
/// Every tick removes documents idle longer than `retention`. The task exits
/// as soon as `shutdown` turns `true` or its sender is dropped, without a
/// final sweep. The first sweep happens one full interval after spawning.
///
/// # Panics
/// Panics if `interval` is zero.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = spawn_sweeper(cache.clone(), interval, retention, shutdown_rx);
/// // Later, during shutdown:
/// shutdown_tx.send(true)?;
/// handle.await?;
/// ```
pub fn spawn_sweeper(
    cache: Arc<DocumentCache>,
    interval: Duration,
    retention: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        info!(
            "Starting cache sweeper with interval of {:?} and retention of {:?}",
            interval, retention
        );

        while !*shutdown.borrow() {
            // Shutdown is polled first so a tick that is due at the same
            // time never sweeps after the signal.
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let removed = cache.sweep(retention).await;

                    if removed > 0 {
                        info!(
                            "Cache sweep: removed {} idle documents, cache size is {} bytes",
                            removed,
                            cache.size_bytes().await
                        );
                    } else {
                        debug!("Cache sweep: no idle documents found");
                    }
                }
            }
        }

        info!("Cache sweeper stopped");
    })
}
