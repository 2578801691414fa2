//! Background cleanup task for expired messages.
//!
//! Runs periodically to delete messages that outlived the retention period
//! without being read.

use crate::config::CleanupConfig;
use crate::storage::SqliteQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Spawn a background cleanup task.
///
/// Returns a handle that can be used to abort the task.
pub fn spawn_cleanup_task(
    queue: Arc<SqliteQueue>,
    config: CleanupConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !config.enabled {
            tracing::info!("Cleanup task disabled");
            return;
        }

        let interval_secs = config.interval_secs.max(1);
        tracing::info!("Cleanup task started (interval: {}s)", interval_secs);

        let mut timer = interval(Duration::from_secs(interval_secs));

        loop {
            timer.tick().await;

            match queue.cleanup_expired().await {
                Ok(deleted) if deleted > 0 => {
                    tracing::info!("Cleanup: deleted {} expired messages", deleted);
                }
                Ok(_) => tracing::debug!("Cleanup: no expired messages"),
                Err(e) => tracing::error!("Cleanup error: {}", e),
            }
        }
    })
}
