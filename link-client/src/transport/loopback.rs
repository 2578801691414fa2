//! Loopback transport for testing.
//!
//! Keeps queues and push attempts in process memory so code written
//! against [`Transport`] can be exercised without any backend. Allows
//! forcing failures and inspecting what was sent.

use super::{Transport, TransportError};
use crate::backend::QueueError;
use crate::context::PairingContext;
use crate::notifier::Notifier;
use crate::skew::notify_if_clock_skew;
use async_trait::async_trait;
use pairlink_types::{Ciphertext, PushEndpoint, QueueName};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A push notification the loopback transport would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackPush {
    /// Endpoint snapshot taken at send time.
    pub endpoint: PushEndpoint,
    /// Send queue of the originating context.
    pub queue: QueueName,
    /// Alert text, `None` for silent sends.
    pub alert: Option<String>,
}

/// In-process transport.
///
/// Clones share state, so two contexts of one pairing can talk through
/// clones of the same loopback.
#[derive(Debug, Default, Clone)]
pub struct LoopbackTransport {
    inner: Arc<Mutex<LoopbackInner>>,
}

#[derive(Debug, Default)]
struct LoopbackInner {
    queues: HashMap<QueueName, VecDeque<Ciphertext>>,
    pushes: Vec<LoopbackPush>,
    fail_next_setup: Option<String>,
    fail_next_send: Option<String>,
    fail_next_read: Option<String>,
}

impl LoopbackTransport {
    /// Create a new loopback transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ciphertexts waiting in a queue.
    pub fn pending(&self, queue: &QueueName) -> Vec<Ciphertext> {
        self.lock()
            .queues
            .get(queue)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Push notifications recorded so far.
    pub fn pushes(&self) -> Vec<LoopbackPush> {
        self.lock().pushes.clone()
    }

    /// Cause the next setup() to fail with the given error.
    pub fn fail_next_setup(&self, error: &str) {
        self.lock().fail_next_setup = Some(error.to_string());
    }

    /// Cause the next send to fail its enqueue with the given error.
    pub fn fail_next_send(&self, error: &str) {
        self.lock().fail_next_send = Some(error.to_string());
    }

    /// Cause the next read() to fail with the given error.
    pub fn fail_next_read(&self, error: &str) {
        self.lock().fail_next_read = Some(error.to_string());
    }

    /// Clear all state (queues, pushes, forced failures).
    pub fn reset(&self) {
        *self.lock() = LoopbackInner::default();
    }

    fn send(
        &self,
        context: &dyn PairingContext,
        alert: Option<&str>,
        message: &[u8],
    ) -> Result<(), TransportError> {
        let ciphertext = context.encrypt(message)?;
        let queue = context.send_queue_name();
        let mut inner = self.lock();

        if let Some(endpoint) = context.push_endpoint() {
            inner.pushes.push(LoopbackPush {
                endpoint,
                queue: queue.clone(),
                alert: alert.map(str::to_owned),
            });
        }

        let failure = match inner.fail_next_send.take() {
            Some(error) => Some(QueueError::Backend(error)),
            None => match inner.queues.get_mut(queue) {
                Some(pending) => {
                    pending.push_back(ciphertext);
                    None
                }
                None => Some(QueueError::NotFound(queue.clone())),
            },
        };

        match failure {
            Some(source) => Err(TransportError::Delivery {
                queue: queue.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn setup(&self, context: &dyn PairingContext) -> Result<(), TransportError> {
        let mut inner = self.lock();

        if let Some(error) = inner.fail_next_setup.take() {
            return Err(TransportError::Provisioning {
                queue: context.send_queue_name().clone(),
                source: QueueError::Backend(error),
            });
        }

        for queue in [context.send_queue_name(), context.recv_queue_name()] {
            inner.queues.entry(queue.clone()).or_default();
        }
        Ok(())
    }

    async fn push_alert(
        &self,
        context: &dyn PairingContext,
        alert_text: &str,
        message: &[u8],
    ) -> Result<(), TransportError> {
        self.send(context, Some(alert_text), message)
    }

    async fn send_message(
        &self,
        context: &dyn PairingContext,
        message: &[u8],
    ) -> Result<(), TransportError> {
        self.send(context, None, message)
    }

    async fn read(
        &self,
        notifier: Option<&dyn Notifier>,
        context: &dyn PairingContext,
    ) -> Result<Vec<Ciphertext>, TransportError> {
        let queue = context.recv_queue_name();

        let result = {
            let mut inner = self.lock();
            match inner.fail_next_read.take() {
                Some(error) => Err(QueueError::Backend(error)),
                None => inner
                    .queues
                    .get_mut(queue)
                    .map(|pending| pending.drain(..).collect())
                    .ok_or_else(|| QueueError::NotFound(queue.clone())),
            }
        };

        result.map_err(|source| {
            notify_if_clock_skew(&source, notifier);
            TransportError::Receive {
                queue: queue.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Pairing;
    use crate::notifier::ChannelNotifier;
    use pairlink_core::{PairingRole, PairingSecret};

    fn peers() -> (Pairing, Pairing) {
        let secret = PairingSecret::generate().unwrap();
        (
            Pairing::new(&secret, PairingRole::Initiator).unwrap(),
            Pairing::new(&secret, PairingRole::Responder).unwrap(),
        )
    }

    // ===========================================
    // LoopbackTransport Basic Tests
    // ===========================================

    #[tokio::test]
    async fn loopback_delivers_between_peers() {
        let transport = LoopbackTransport::new();
        let (host, device) = peers();
        transport.setup(&host).await.unwrap();

        transport.send_message(&host, b"message 1").await.unwrap();
        transport.send_message(&host, b"message 2").await.unwrap();

        let received = transport.read(None, &device).await.unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(device.decrypt(&received[0]).unwrap(), b"message 1");
        assert_eq!(device.decrypt(&received[1]).unwrap(), b"message 2");
        assert!(transport.pending(host.send_queue_name()).is_empty());
    }

    #[tokio::test]
    async fn loopback_records_pushes_only_with_endpoint() {
        let transport = LoopbackTransport::new();
        let (host, _) = peers();
        transport.setup(&host).await.unwrap();

        transport.send_message(&host, b"quiet").await.unwrap();
        assert!(transport.pushes().is_empty());

        host.set_push_endpoint(Some(PushEndpoint::new("device-token").unwrap()));
        transport.push_alert(&host, "Login request", b"loud").await.unwrap();

        let pushes = transport.pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].alert.as_deref(), Some("Login request"));
        assert_eq!(&pushes[0].queue, host.send_queue_name());
    }

    #[tokio::test]
    async fn loopback_clone_shares_state() {
        let a = LoopbackTransport::new();
        let b = a.clone();
        let (host, device) = peers();
        a.setup(&host).await.unwrap();

        a.send_message(&host, b"from a").await.unwrap();
        assert_eq!(b.read(None, &device).await.unwrap().len(), 1);
    }

    // ===========================================
    // Error Condition Tests
    // ===========================================

    #[tokio::test]
    async fn send_without_setup_fails() {
        let transport = LoopbackTransport::new();
        let (host, _) = peers();

        let result = transport.send_message(&host, b"data").await;
        assert!(matches!(
            result,
            Err(TransportError::Delivery {
                source: QueueError::NotFound(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn forced_setup_failure() {
        let transport = LoopbackTransport::new();
        let (host, _) = peers();
        transport.fail_next_setup("AccessDenied");

        let result = transport.setup(&host).await;
        assert!(matches!(result, Err(TransportError::Provisioning { .. })));
        transport.setup(&host).await.unwrap();
    }

    #[tokio::test]
    async fn forced_send_failure_still_records_push() {
        let transport = LoopbackTransport::new();
        let (host, _) = peers();
        host.set_push_endpoint(Some(PushEndpoint::new("device-token").unwrap()));
        transport.setup(&host).await.unwrap();
        transport.fail_next_send("queue full");

        let result = transport.send_message(&host, b"data").await;
        assert!(matches!(result, Err(TransportError::Delivery { .. })));
        assert_eq!(transport.pushes().len(), 1);
        assert!(transport.pending(host.send_queue_name()).is_empty());
    }

    #[tokio::test]
    async fn forced_read_failure_runs_skew_detection() {
        let transport = LoopbackTransport::new();
        let (host, device) = peers();
        transport.setup(&host).await.unwrap();
        transport.send_message(&host, b"kept").await.unwrap();
        transport.fail_next_read("Signature expired");
        let (notifier, mut rx) = ChannelNotifier::channel();

        let result = transport.read(Some(&notifier), &device).await;
        assert!(matches!(result, Err(TransportError::Receive { .. })));
        assert!(rx.try_recv().is_ok());

        // Next read works and still sees the queued message
        assert_eq!(transport.read(Some(&notifier), &device).await.unwrap().len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn loopback_reset_clears_all() {
        let transport = LoopbackTransport::new();
        let (host, _) = peers();
        host.set_push_endpoint(Some(PushEndpoint::new("device-token").unwrap()));
        transport.setup(&host).await.unwrap();
        transport.send_message(&host, b"data").await.unwrap();

        transport.reset();

        assert!(transport.pushes().is_empty());
        assert!(transport.pending(host.send_queue_name()).is_empty());
        assert!(transport.send_message(&host, b"again").await.is_err());
    }
}
