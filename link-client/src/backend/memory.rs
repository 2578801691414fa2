//! In-memory queue and push backends.
//!
//! Both allow forcing failures and inspecting what was called, so the
//! transport's behaviour can be verified without a relay.

use super::{PushBackend, PushError, QueueBackend, QueueError};
use async_trait::async_trait;
use dashmap::DashMap;
use pairlink_types::{PushEndpoint, QueueName};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Maximum entries returned by one receive call (matches common cloud queues).
pub const DEFAULT_MAX_BATCH: usize = 10;

/// In-memory queue backend.
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryQueue {
    inner: Arc<MemoryQueueInner>,
}

#[derive(Debug)]
struct MemoryQueueInner {
    queues: DashMap<QueueName, VecDeque<String>>,
    max_batch: usize,
    control: Mutex<QueueControl>,
}

#[derive(Debug, Default)]
struct QueueControl {
    create_calls: Vec<QueueName>,
    fail_next_create: Option<String>,
    fail_next_enqueue: Option<String>,
    fail_next_receive: Option<String>,
}

impl MemoryQueue {
    /// Create an empty backend with the default batch size.
    pub fn new() -> Self {
        Self::with_max_batch(DEFAULT_MAX_BATCH)
    }

    /// Create an empty backend returning at most `max_batch` entries per receive.
    pub fn with_max_batch(max_batch: usize) -> Self {
        Self {
            inner: Arc::new(MemoryQueueInner {
                queues: DashMap::new(),
                max_batch: max_batch.max(1),
                control: Mutex::new(QueueControl::default()),
            }),
        }
    }

    fn control(&self) -> MutexGuard<'_, QueueControl> {
        self.inner
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Every successful `create_queue` call, in order.
    pub fn created_queues(&self) -> Vec<QueueName> {
        self.control().create_calls.clone()
    }

    /// Entries currently waiting in a queue (empty if it doesn't exist).
    pub fn pending(&self, name: &QueueName) -> Vec<String> {
        self.inner
            .queues
            .get(name)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append a raw entry, bypassing validation and creating the queue if needed.
    pub fn inject_raw(&self, name: &QueueName, entry: impl Into<String>) {
        self.inner
            .queues
            .entry(name.clone())
            .or_default()
            .push_back(entry.into());
    }

    /// Cause the next create_queue() to fail with the given error.
    pub fn fail_next_create(&self, error: &str) {
        self.control().fail_next_create = Some(error.to_string());
    }

    /// Cause the next enqueue() to fail with the given error.
    pub fn fail_next_enqueue(&self, error: &str) {
        self.control().fail_next_enqueue = Some(error.to_string());
    }

    /// Cause the next receive_and_delete_all() to fail with the given error.
    pub fn fail_next_receive(&self, error: &str) {
        self.control().fail_next_receive = Some(error.to_string());
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueBackend for MemoryQueue {
    async fn create_queue(&self, name: &QueueName) -> Result<(), QueueError> {
        {
            let mut control = self.control();
            if let Some(error) = control.fail_next_create.take() {
                return Err(QueueError::Backend(error));
            }
            control.create_calls.push(name.clone());
        }

        self.inner.queues.entry(name.clone()).or_default();
        Ok(())
    }

    async fn enqueue(&self, name: &QueueName, payload: &str) -> Result<(), QueueError> {
        if let Some(error) = self.control().fail_next_enqueue.take() {
            return Err(QueueError::Backend(error));
        }

        match self.inner.queues.get_mut(name) {
            Some(mut queue) => {
                queue.push_back(payload.to_string());
                Ok(())
            }
            None => Err(QueueError::NotFound(name.clone())),
        }
    }

    async fn receive_and_delete_all(&self, name: &QueueName) -> Result<Vec<String>, QueueError> {
        if let Some(error) = self.control().fail_next_receive.take() {
            return Err(QueueError::Backend(error));
        }

        match self.inner.queues.get_mut(name) {
            Some(mut queue) => {
                let take = queue.len().min(self.inner.max_batch);
                Ok(queue.drain(..take).collect())
            }
            None => Err(QueueError::NotFound(name.clone())),
        }
    }
}

/// A push notification attempt seen by [`MemoryPush`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    /// Endpoint the notification was addressed to.
    pub endpoint: PushEndpoint,
    /// Queue the announced message was written to.
    pub queue: QueueName,
    /// Transit-encoded ciphertext.
    pub payload: String,
    /// Alert text, `None` for silent notifications.
    pub alert: Option<String>,
}

#[derive(Debug, Clone, Default)]
enum PushMode {
    #[default]
    Succeed,
    Fail(String),
    Hang,
}

/// In-memory push backend that records every attempt.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryPush {
    inner: Arc<MemoryPushInner>,
}

#[derive(Debug, Default)]
struct MemoryPushInner {
    records: Mutex<Vec<PushRecord>>,
    mode: Mutex<PushMode>,
    arrived: Notify,
}

impl MemoryPush {
    /// Create a backend that accepts every notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later attempt fail with the given error.
    pub fn fail_with(&self, error: &str) {
        *self.mode() = PushMode::Fail(error.to_string());
    }

    /// Make every later attempt hang forever.
    pub fn hang(&self) {
        *self.mode() = PushMode::Hang;
    }

    /// All attempts so far, in arrival order.
    pub fn records(&self) -> Vec<PushRecord> {
        self.inner
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until at least `count` attempts have been recorded.
    ///
    /// Wrap in a timeout; this waits forever if the attempts never come.
    pub async fn wait_for(&self, count: usize) -> Vec<PushRecord> {
        loop {
            let records = self.records();
            if records.len() >= count {
                return records;
            }
            self.inner.arrived.notified().await;
        }
    }

    fn mode(&self) -> MutexGuard<'_, PushMode> {
        self.inner.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn attempt(&self, record: PushRecord) -> Result<(), PushError> {
        self.inner
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        self.inner.arrived.notify_one();

        let mode = self.mode().clone();
        match mode {
            PushMode::Succeed => Ok(()),
            PushMode::Fail(error) => Err(PushError::Delivery(error)),
            PushMode::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl PushBackend for MemoryPush {
    async fn notify_silent(
        &self,
        payload: &str,
        endpoint: &PushEndpoint,
        queue: &QueueName,
    ) -> Result<(), PushError> {
        self.attempt(PushRecord {
            endpoint: endpoint.clone(),
            queue: queue.clone(),
            payload: payload.to_string(),
            alert: None,
        })
        .await
    }

    async fn notify_alert(
        &self,
        alert: &str,
        payload: &str,
        endpoint: &PushEndpoint,
        queue: &QueueName,
    ) -> Result<(), PushError> {
        self.attempt(PushRecord {
            endpoint: endpoint.clone(),
            queue: queue.clone(),
            payload: payload.to_string(),
            alert: Some(alert.to_string()),
        })
        .await
    }
}
