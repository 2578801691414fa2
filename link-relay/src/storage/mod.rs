//! Storage layer for pairlink-relay.
//!
//! Provides durable named queues with destructive, batched receives.

mod sqlite;

pub use sqlite::SqliteQueue;

use crate::config::Config;

/// Limits applied by a queue store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueLimits {
    /// Maximum transit-encoded payload size in bytes.
    pub max_payload_size: usize,
    /// Maximum messages returned by one receive call.
    pub max_batch: u32,
    /// Seconds an unread message is kept before it expires.
    pub retention_secs: u64,
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for QueueLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_payload_size: config.storage.max_payload_size,
            max_batch: config.receive.max_batch.max(1),
            retention_secs: config.storage.retention_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_config() {
        let mut config = Config::default();
        config.storage.max_payload_size = 1024;
        config.receive.max_batch = 3;
        config.storage.retention_secs = 60;

        let limits = QueueLimits::from(&config);
        assert_eq!(limits.max_payload_size, 1024);
        assert_eq!(limits.max_batch, 3);
        assert_eq!(limits.retention_secs, 60);
    }

    #[test]
    fn zero_batch_is_clamped() {
        let mut config = Config::default();
        config.receive.max_batch = 0;
        assert_eq!(QueueLimits::from(&config).max_batch, 1);
    }
}
