//! # pairlink-core
//!
//! Pure logic for pairlink (no I/O, instant tests).
//!
//! This crate holds the decisions the transport makes without touching a
//! network or a disk:
//! - [`pairing`]: the shared pairing secret, peer roles and queue naming
//! - [`skew`]: classification of receive failures caused by clock drift and
//!   the diagnostic shown to the user
//!
//! The actual I/O is performed by `pairlink-client`, which calls into these
//! functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pairing;
pub mod skew;

pub use pairing::{PairingError, PairingRole, PairingSecret, QueueNames, SECRET_SIZE};
pub use skew::{
    classify_receive_failure, clock_skew_diagnostic, ntp_update_command, ReceiveFailure,
    SIGNATURE_EXPIRED_MARKER,
};
