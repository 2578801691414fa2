//! Pairing secret, peer roles and queue naming.
//!
//! Two peers that share a [`PairingSecret`] derive the same [`PairingId`]
//! and from it the same pair of queues. Each queue carries traffic in one
//! direction only:
//!
//! ```text
//! {base}-to-responder   initiator ──► responder
//! {base}-to-initiator   responder ──► initiator
//! ```
//!
//! Names are relative to the context owner, so the initiator's send queue
//! is the responder's receive queue and vice versa.

use pairlink_types::{PairingId, QueueName, TypesError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the pairing secret in bytes.
pub const SECRET_SIZE: usize = 32;

/// Number of id bytes (hex-encoded) used as the queue-name base.
const QUEUE_BASE_BYTES: usize = 16;

/// Error type for pairing operations.
#[derive(Debug, Error)]
pub enum PairingError {
    /// The secret was not valid hex or had the wrong length.
    #[error("invalid pairing secret: {0}")]
    InvalidSecret(String),

    /// The system random source failed.
    #[error("random source unavailable: {0}")]
    Random(String),

    /// The role string was not recognized.
    #[error("unknown pairing role: {0}")]
    UnknownRole(String),

    /// A derived queue name was rejected.
    #[error("derived queue name rejected: {0}")]
    QueueName(#[from] TypesError),
}

/// Which side of the pairing a context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairingRole {
    /// The peer that created the pairing (typically the host).
    Initiator,
    /// The peer that joined it (typically the companion device).
    Responder,
}

impl PairingRole {
    /// The role of the other peer.
    pub fn peer(self) -> Self {
        match self {
            PairingRole::Initiator => PairingRole::Responder,
            PairingRole::Responder => PairingRole::Initiator,
        }
    }

    /// Lowercase name used in queue names and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            PairingRole::Initiator => "initiator",
            PairingRole::Responder => "responder",
        }
    }
}

impl fmt::Display for PairingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PairingRole {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiator" => Ok(PairingRole::Initiator),
            "responder" => Ok(PairingRole::Responder),
            other => Err(PairingError::UnknownRole(other.to_string())),
        }
    }
}

/// A 32-byte symmetric secret shared by both peers of a pairing.
///
/// Used for:
/// - Encryption key derivation (via HKDF, in `pairlink-client`)
/// - Pairing id and queue-name derivation
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PairingSecret([u8; SECRET_SIZE]);

impl PairingSecret {
    /// Generate a new random secret.
    pub fn generate() -> Result<Self, PairingError> {
        let mut bytes = [0u8; SECRET_SIZE];
        getrandom::getrandom(&mut bytes).map_err(|e| PairingError::Random(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; SECRET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a hex-encoded secret.
    pub fn from_hex(text: &str) -> Result<Self, PairingError> {
        let mut decoded =
            hex::decode(text.trim()).map_err(|e| PairingError::InvalidSecret(e.to_string()))?;
        if decoded.len() != SECRET_SIZE {
            let len = decoded.len();
            decoded.zeroize();
            return Err(PairingError::InvalidSecret(format!(
                "expected {} bytes, got {}",
                SECRET_SIZE, len
            )));
        }
        let mut bytes = [0u8; SECRET_SIZE];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self(bytes))
    }

    /// Hex-encode the secret for storage or out-of-band sharing.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_SIZE] {
        &self.0
    }

    /// Derive the PairingId from this secret.
    pub fn pairing_id(&self) -> PairingId {
        PairingId::from_secret(&self.0)
    }
}

// Intentionally opaque debug to avoid logging secrets
impl fmt::Debug for PairingSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairingSecret([REDACTED])")
    }
}

/// The send and receive queue names of one side of a pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNames {
    /// Queue this side writes to.
    pub send: QueueName,
    /// Queue this side reads from.
    pub recv: QueueName,
}

impl QueueNames {
    /// Derive the queue names for `role` within the pairing `id`.
    pub fn derive(id: &PairingId, role: PairingRole) -> Result<Self, PairingError> {
        let base = hex::encode(&id.as_bytes()[..QUEUE_BASE_BYTES]);
        let inbox = |owner: PairingRole| QueueName::new(format!("{}-to-{}", base, owner));

        Ok(Self {
            send: inbox(role.peer())?,
            recv: inbox(role)?,
        })
    }
}
