//! Pairing context: what the transport needs to know about a pairing.
//!
//! The transport never owns pairing state. It borrows a [`PairingContext`]
//! per call and uses it for four things: the two queue names, encryption,
//! and a snapshot of the peer's push endpoint.

use pairlink_core::{PairingError, PairingRole, PairingSecret, QueueNames};
use pairlink_types::{Ciphertext, PairingId, PushEndpoint, QueueName};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::crypto::{CryptoError, PairingKey};

/// Identity and capability bundle of one side of a pairing.
pub trait PairingContext: Send + Sync {
    /// Queue this side writes to.
    fn send_queue_name(&self) -> &QueueName;

    /// Queue this side reads from. Always differs from the send queue.
    fn recv_queue_name(&self) -> &QueueName;

    /// Encrypt a message for the peer.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Ciphertext, CryptoError>;

    /// Copy of the currently registered push endpoint, if any.
    ///
    /// Implementations take their lock only long enough to clone the value.
    fn push_endpoint(&self) -> Option<PushEndpoint>;
}

/// Errors building a [`Pairing`].
#[derive(Debug, Error)]
pub enum ContextError {
    /// Queue naming or secret handling failed.
    #[error("pairing error: {0}")]
    Pairing(#[from] PairingError),

    /// Key derivation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Concrete pairing context backed by a shared [`PairingSecret`].
pub struct Pairing {
    id: PairingId,
    role: PairingRole,
    queues: QueueNames,
    key: PairingKey,
    push_endpoint: Mutex<Option<PushEndpoint>>,
}

impl Pairing {
    /// Build the context for `role` from the shared secret.
    pub fn new(secret: &PairingSecret, role: PairingRole) -> Result<Self, ContextError> {
        let id = secret.pairing_id();
        Ok(Self {
            id,
            role,
            queues: QueueNames::derive(&id, role)?,
            key: PairingKey::derive(secret)?,
            push_endpoint: Mutex::new(None),
        })
    }

    /// Set the push endpoint at construction time.
    pub fn with_push_endpoint(self, endpoint: PushEndpoint) -> Self {
        self.set_push_endpoint(Some(endpoint));
        self
    }

    /// The pairing identifier shared by both peers.
    pub fn id(&self) -> &PairingId {
        &self.id
    }

    /// Which side of the pairing this context belongs to.
    pub fn role(&self) -> PairingRole {
        self.role
    }

    /// Replace the registered push endpoint, returning the previous one.
    pub fn set_push_endpoint(&self, endpoint: Option<PushEndpoint>) -> Option<PushEndpoint> {
        let mut slot = self
            .push_endpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, endpoint)
    }

    /// Decrypt a ciphertext received from the peer.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>, CryptoError> {
        self.key.decrypt(ciphertext)
    }
}

impl PairingContext for Pairing {
    fn send_queue_name(&self) -> &QueueName {
        &self.queues.send
    }

    fn recv_queue_name(&self) -> &QueueName {
        &self.queues.recv
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Ciphertext, CryptoError> {
        self.key.encrypt(plaintext)
    }

    fn push_endpoint(&self) -> Option<PushEndpoint> {
        self.push_endpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for Pairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pairing")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("queues", &self.queues)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
