//! One-stop wiring of the relay backends.
//!
//! [`Relay`] opens the SQLite queue store and builds the webhook client from
//! a single [`Config`], then hands out transports over them.

use crate::cleanup::spawn_cleanup_task;
use crate::config::Config;
use crate::error::RelayError;
use crate::push::WebhookPush;
use crate::storage::{QueueLimits, SqliteQueue};
use pairlink_client::QueueTransport;
use std::path::Path;
use std::sync::Arc;

/// SQLite queues and webhook push wired together from one [`Config`].
#[derive(Clone)]
pub struct Relay {
    config: Config,
    queue: Arc<SqliteQueue>,
    push: Arc<WebhookPush>,
}

impl Relay {
    /// Open the queue database and build the push client.
    pub async fn open(config: Config) -> Result<Self, RelayError> {
        let queue = SqliteQueue::new(&config.storage.database, QueueLimits::from(&config)).await?;
        let push = WebhookPush::new(&config.push)?;

        Ok(Self {
            config,
            queue: Arc::new(queue),
            push: Arc::new(push),
        })
    }

    /// Load configuration from a TOML file, then [`Relay::open`].
    pub async fn from_config_file(path: &Path) -> Result<Self, RelayError> {
        Self::open(Config::from_file(path)?).await
    }

    /// Configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The queue store.
    pub fn queue(&self) -> &Arc<SqliteQueue> {
        &self.queue
    }

    /// A transport over this relay's queues and push backend.
    pub fn transport(&self) -> QueueTransport {
        QueueTransport::new(self.queue.clone(), self.push.clone())
    }

    /// Start the expired-message cleanup task.
    pub fn spawn_cleanup(&self) -> tokio::task::JoinHandle<()> {
        spawn_cleanup_task(self.queue.clone(), self.config.cleanup.clone())
    }
}
