//! # pairlink-types
//!
//! Wire-level types for the pairlink encrypted message transport.
//!
//! This crate provides the foundational types used across all pairlink crates:
//! - [`PairingId`], [`QueueName`], [`PushEndpoint`] - Identity and addressing types
//! - [`Ciphertext`] - Opaque encrypted payload and its transit (base64) encoding
//! - [`TypesError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod transit;

pub use error::TypesError;
pub use ids::{PairingId, PushEndpoint, QueueName, MAX_QUEUE_NAME_LEN};
pub use transit::{decode_transit, encode_transit, Ciphertext};
