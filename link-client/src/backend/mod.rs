//! Relay backends consumed by the transport.
//!
//! Two collaborators, both outside pairlink's control in production:
//! - [`QueueBackend`]: durable named queues (create, enqueue,
//!   receive-and-delete-all)
//! - [`PushBackend`]: best-effort wake-up notifications to a registered
//!   endpoint
//!
//! The in-memory implementations in this module back the tests and any
//! single-process setup; `pairlink-relay` provides SQLite and webhook ones.

mod memory;

pub use memory::{MemoryPush, MemoryQueue, PushRecord, DEFAULT_MAX_BATCH};

use async_trait::async_trait;
use pairlink_types::{PushEndpoint, QueueName};
use thiserror::Error;

/// Queue backend errors.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue has not been created.
    #[error("queue does not exist: {0}")]
    NotFound(QueueName),

    /// The payload exceeds what the backend accepts.
    #[error("payload too large: {size} bytes (limit: {limit} bytes)")]
    PayloadTooLarge {
        /// Size of the rejected payload.
        size: usize,
        /// Maximum accepted size.
        limit: usize,
    },

    /// Any other backend failure, carrying the backend's own description.
    #[error("queue backend error: {0}")]
    Backend(String),
}

/// Push backend errors.
#[derive(Debug, Error)]
pub enum PushError {
    /// The endpoint or push service refused the notification.
    #[error("push rejected: {0}")]
    Rejected(String),

    /// The notification could not be delivered to the push service.
    #[error("push delivery failed: {0}")]
    Delivery(String),

    /// The push service did not answer in time.
    #[error("push timed out")]
    Timeout,

    /// Push delivery is switched off for this backend.
    #[error("push notifications disabled")]
    Disabled,
}

/// Durable, named message queues.
///
/// Ordering across concurrent writers is not guaranteed; a single writer's
/// enqueues are observed in issuance order.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Create a queue. Creating an existing queue is backend-defined; the
    /// provided backends treat it as a no-op.
    async fn create_queue(&self, name: &QueueName) -> Result<(), QueueError>;

    /// Append a textual payload to a queue.
    async fn enqueue(&self, name: &QueueName, payload: &str) -> Result<(), QueueError>;

    /// Remove and return one batch of payloads, in delivery order.
    ///
    /// Consumption is destructive: returned entries are gone from the queue.
    async fn receive_and_delete_all(&self, name: &QueueName) -> Result<Vec<String>, QueueError>;
}

/// Best-effort wake-up notifications.
#[async_trait]
pub trait PushBackend: Send + Sync {
    /// Send a silent (background) notification carrying `payload`.
    async fn notify_silent(
        &self,
        payload: &str,
        endpoint: &PushEndpoint,
        queue: &QueueName,
    ) -> Result<(), PushError>;

    /// Send a user-visible notification showing `alert` and carrying `payload`.
    async fn notify_alert(
        &self,
        alert: &str,
        payload: &str,
        endpoint: &PushEndpoint,
        queue: &QueueName,
    ) -> Result<(), PushError>;
}
