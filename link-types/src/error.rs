//! Error types for pairlink wire-level types.

use thiserror::Error;

/// Errors that can occur while constructing or decoding wire-level values.
#[derive(Debug, Error)]
pub enum TypesError {
    /// A queue name broke the naming rules.
    #[error("invalid queue name {name:?}: {reason}")]
    InvalidQueueName {
        /// The rejected name.
        name: String,
        /// Which rule it broke.
        reason: &'static str,
    },

    /// A push endpoint handle was empty.
    #[error("push endpoint must not be empty")]
    EmptyPushEndpoint,

    /// A received entry was not valid transit-encoded data.
    #[error("invalid transit encoding: {0}")]
    InvalidTransit(#[source] base64::DecodeError),
}
