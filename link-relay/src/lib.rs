//! # pairlink-relay
//!
//! Concrete relay backends for pairlink.
//!
//! This crate implements the collaborators `pairlink-client` only knows
//! through traits:
//! - [`SqliteQueue`]: durable named queues on SQLite
//! - [`WebhookPush`]: push notifications delivered as HTTP webhooks
//!
//! ## Architecture
//!
//! ```text
//! Host ──┐                                   ┌── Device
//!        │  enqueue          receive+delete  │
//!        ├───────────►┌─────────────┐◄───────┤
//!        │            │ SqliteQueue │        │
//!        │            └─────────────┘        │
//!        │  webhook POST                     │
//!        └──────────► WebhookPush ──────────►┘ (wake-up)
//! ```
//!
//! Payloads are ciphertexts in transit encoding; the relay never sees
//! plaintext.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleanup;
pub mod config;
pub mod error;
pub mod push;
mod relay;
pub mod storage;

pub use config::Config;
pub use error::{RelayError, StorageError};
pub use push::WebhookPush;
pub use relay::Relay;
pub use storage::{QueueLimits, SqliteQueue};
