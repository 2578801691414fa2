//! # pairlink-client
//!
//! Dual-channel transport for encrypted messages between two paired peers.
//!
//! Every send takes two independent paths:
//!
//! ```text
//!                 ┌── enqueue ─────────► durable queue   (result returned)
//! send(message) ──┤
//!                 └── spawn ──► push ──► peer endpoint   (logged only)
//! ```
//!
//! The queue is the correctness boundary: a send succeeds exactly when the
//! enqueue does. The push notification only shortens the time until the
//! peer polls, and is never allowed to block or fail the send.
//!
//! ## Features
//!
//! - **Transport Abstraction**: [`Transport`] with a queue-backed
//!   ([`QueueTransport`]) and an in-memory ([`LoopbackTransport`]) variant
//! - **Pluggable Backends**: [`QueueBackend`] and [`PushBackend`] traits
//! - **E2E Encryption**: XChaCha20-Poly1305 with 192-bit nonces
//! - **Clock-Skew Diagnostics**: receive failures caused by clock drift are
//!   reported to the user through a [`Notifier`]
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pairlink_client::{MemoryPush, MemoryQueue, Pairing, QueueTransport, Transport};
//! use pairlink_core::{PairingRole, PairingSecret};
//!
//! let secret = PairingSecret::generate()?;
//! let host = Pairing::new(&secret, PairingRole::Initiator)?;
//! let transport = QueueTransport::new(Arc::new(MemoryQueue::new()), Arc::new(MemoryPush::new()));
//!
//! transport.setup(&host).await?;
//! transport.send_message(&host, b"hello").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod context;
pub mod crypto;
pub mod notifier;
pub mod skew;
pub mod transport;

pub use backend::{
    MemoryPush, MemoryQueue, PushBackend, PushError, PushRecord, QueueBackend, QueueError,
    DEFAULT_MAX_BATCH,
};
pub use context::{ContextError, Pairing, PairingContext};
pub use crypto::{CryptoError, PairingKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use notifier::{ChannelNotifier, Notifier};
pub use skew::notify_if_clock_skew;
pub use transport::{LoopbackPush, LoopbackTransport, QueueTransport, Transport, TransportError};
