//! Transport abstraction for pairlink.
//!
//! This module provides the four operations callers use to talk to their
//! paired peer, independent of which relay carries the messages.
//!
//! # Design
//!
//! - `setup()` provisions the pairing's send and receive queues
//! - `push_alert()` / `send_message()` encrypt, enqueue durably, and fire a
//!   detached push notification if the peer registered an endpoint
//! - `read()` drains one batch from the receive queue
//!
//! Two implementations ship here: [`QueueTransport`] composes a
//! [`QueueBackend`](crate::QueueBackend) with a
//! [`PushBackend`](crate::PushBackend); [`LoopbackTransport`] keeps
//! everything in process for testing callers.

mod loopback;
mod queue;

pub use loopback::{LoopbackPush, LoopbackTransport};
pub use queue::QueueTransport;

use async_trait::async_trait;
use pairlink_types::{Ciphertext, QueueName};
use thiserror::Error;

use crate::backend::QueueError;
use crate::context::PairingContext;
use crate::crypto::CryptoError;
use crate::notifier::Notifier;

/// Transport errors.
///
/// Push notification failures never appear here; they are logged only.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A queue could not be created.
    #[error("failed to provision queue {queue}: {source}")]
    Provisioning {
        /// Queue whose creation failed.
        queue: QueueName,
        /// Backend error.
        #[source]
        source: QueueError,
    },

    /// The message could not be encrypted; no channel was touched.
    #[error("encryption failed: {0}")]
    Encryption(#[from] CryptoError),

    /// The durable enqueue failed.
    #[error("failed to enqueue onto {queue}: {source}")]
    Delivery {
        /// Send queue.
        queue: QueueName,
        /// Backend error.
        #[source]
        source: QueueError,
    },

    /// The receive call failed.
    #[error("failed to receive from {queue}: {source}")]
    Receive {
        /// Receive queue.
        queue: QueueName,
        /// Backend error.
        #[source]
        source: QueueError,
    },
}

/// Transport for encrypted messages between two paired peers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Ensure the context's send and receive queues exist.
    ///
    /// Safe to call repeatedly as far as the backend's create is. Stops at
    /// the first failure without undoing a queue already created.
    async fn setup(&self, context: &dyn PairingContext) -> Result<(), TransportError>;

    /// Send a message and wake the peer with a visible alert.
    ///
    /// The result reflects the durable enqueue only.
    async fn push_alert(
        &self,
        context: &dyn PairingContext,
        alert_text: &str,
        message: &[u8],
    ) -> Result<(), TransportError>;

    /// Send a message and wake the peer silently.
    ///
    /// The result reflects the durable enqueue only.
    async fn send_message(
        &self,
        context: &dyn PairingContext,
        message: &[u8],
    ) -> Result<(), TransportError>;

    /// Receive and remove one batch of ciphertexts from the receive queue.
    ///
    /// Entries that are not valid transit encoding are dropped. On backend
    /// failure the error is checked for clock skew (reported through
    /// `notifier`) and then returned.
    async fn read(
        &self,
        notifier: Option<&dyn Notifier>,
        context: &dyn PairingContext,
    ) -> Result<Vec<Ciphertext>, TransportError>;
}
