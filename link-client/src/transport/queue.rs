//! Queue-backed transport.
//!
//! Composes a durable [`QueueBackend`] with a best-effort [`PushBackend`].

use async_trait::async_trait;
use pairlink_types::{Ciphertext, PushEndpoint, QueueName};
use std::sync::Arc;

use super::{Transport, TransportError};
use crate::backend::{PushBackend, QueueBackend};
use crate::context::PairingContext;
use crate::notifier::Notifier;
use crate::skew::notify_if_clock_skew;

/// Transport over a durable queue backend plus a push backend.
///
/// Cheap to clone; clones share the backends.
#[derive(Clone)]
pub struct QueueTransport {
    queues: Arc<dyn QueueBackend>,
    push: Arc<dyn PushBackend>,
}

/// Everything the detached push task needs, owned.
struct Notification {
    endpoint: PushEndpoint,
    queue: QueueName,
    payload: String,
    alert: Option<String>,
}

impl QueueTransport {
    /// Create a transport over the given backends.
    pub fn new(queues: Arc<dyn QueueBackend>, push: Arc<dyn PushBackend>) -> Self {
        Self { queues, push }
    }

    async fn send(
        &self,
        context: &dyn PairingContext,
        alert: Option<&str>,
        message: &[u8],
    ) -> Result<(), TransportError> {
        let ciphertext = context.encrypt(message)?;
        let payload = ciphertext.to_transit();
        let queue = context.send_queue_name();

        // Snapshot only; the context lock is released before any network call.
        if let Some(endpoint) = context.push_endpoint() {
            self.spawn_notification(Notification {
                endpoint,
                queue: queue.clone(),
                payload: payload.clone(),
                alert: alert.map(str::to_owned),
            });
        }

        self.queues
            .enqueue(queue, &payload)
            .await
            .map_err(|source| TransportError::Delivery {
                queue: queue.clone(),
                source,
            })?;

        tracing::debug!(queue = %queue, bytes = ciphertext.len(), "message enqueued");
        Ok(())
    }

    /// Fire the push notification on its own task and forget about it.
    ///
    /// The join handle is dropped: the caller cannot await, cancel or observe
    /// the attempt. Failures only reach the log.
    fn spawn_notification(&self, notification: Notification) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                queue = %notification.queue,
                "no async runtime available, skipping push notification"
            );
            return;
        };

        let push = Arc::clone(&self.push);
        runtime.spawn(async move {
            let Notification {
                endpoint,
                queue,
                payload,
                alert,
            } = notification;

            let result = match alert.as_deref() {
                Some(alert) => push.notify_alert(alert, &payload, &endpoint, &queue).await,
                None => push.notify_silent(&payload, &endpoint, &queue).await,
            };

            match result {
                Ok(()) => tracing::debug!(queue = %queue, "push notification sent"),
                Err(e) => tracing::warn!(queue = %queue, error = %e, "push notification failed"),
            }
        });
    }
}

impl std::fmt::Debug for QueueTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for QueueTransport {
    async fn setup(&self, context: &dyn PairingContext) -> Result<(), TransportError> {
        for queue in [context.send_queue_name(), context.recv_queue_name()] {
            self.queues
                .create_queue(queue)
                .await
                .map_err(|source| TransportError::Provisioning {
                    queue: queue.clone(),
                    source,
                })?;
            tracing::debug!(queue = %queue, "queue provisioned");
        }
        Ok(())
    }

    async fn push_alert(
        &self,
        context: &dyn PairingContext,
        alert_text: &str,
        message: &[u8],
    ) -> Result<(), TransportError> {
        self.send(context, Some(alert_text), message).await
    }

    async fn send_message(
        &self,
        context: &dyn PairingContext,
        message: &[u8],
    ) -> Result<(), TransportError> {
        self.send(context, None, message).await
    }

    async fn read(
        &self,
        notifier: Option<&dyn Notifier>,
        context: &dyn PairingContext,
    ) -> Result<Vec<Ciphertext>, TransportError> {
        let queue = context.recv_queue_name();

        let entries = match self.queues.receive_and_delete_all(queue).await {
            Ok(entries) => entries,
            Err(source) => {
                notify_if_clock_skew(&source, notifier);
                return Err(TransportError::Receive {
                    queue: queue.clone(),
                    source,
                });
            }
        };

        let received = entries.len();
        let ciphertexts: Vec<Ciphertext> = entries
            .iter()
            .filter_map(|entry| match Ciphertext::from_transit(entry) {
                Ok(ciphertext) => Some(ciphertext),
                Err(e) => {
                    tracing::warn!(queue = %queue, error = %e, "dropping undecodable queue entry");
                    None
                }
            })
            .collect();

        tracing::debug!(
            queue = %queue,
            received,
            decoded = ciphertexts.len(),
            "read batch"
        );
        Ok(ciphertexts)
    }
}
