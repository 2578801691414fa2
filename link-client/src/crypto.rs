//! Message encryption for a pairing.
//!
//! This module provides:
//! - [`PairingKey`], derived from the shared pairing secret via HKDF-SHA256
//! - XChaCha20-Poly1305 encryption with random 192-bit nonces
//!
//! # Ciphertext Layout
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ nonce (24 B) │ aead output (len + 16 B tag) │
//! └──────────────┴──────────────────────────────┘
//! ```
//!
//! The nonce travels with the ciphertext so the transport can treat the
//! whole thing as one opaque byte string.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use pairlink_core::PairingSecret;
use pairlink_types::Ciphertext;
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Nonce size for XChaCha20-Poly1305 (192 bits = 24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Key size for XChaCha20-Poly1305 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Crypto errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (authentication error).
    #[error("decryption failed: authentication error")]
    DecryptionFailed,

    /// Ciphertext is too short to hold a nonce and a tag.
    #[error("ciphertext too short: {len} bytes")]
    Truncated {
        /// Length of the rejected ciphertext.
        len: usize,
    },

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),
}

/// Symmetric key shared by both peers of a pairing.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PairingKey {
    encryption_key: [u8; KEY_SIZE],
}

impl PairingKey {
    /// Derive the message key from a pairing secret.
    pub fn derive(secret: &PairingSecret) -> Result<Self, CryptoError> {
        let hkdf = Hkdf::<Sha256>::new(Some(b"pairlink-pairing-key-v1"), secret.as_bytes());

        let mut encryption_key = [0u8; KEY_SIZE];
        hkdf.expand(b"message-encryption", &mut encryption_key)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

        Ok(Self { encryption_key })
    }

    /// Encrypt a message using XChaCha20-Poly1305.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Ciphertext, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| CryptoError::EncryptionFailed(format!("nonce generation: {}", e)))?;
        let nonce = XNonce::from_slice(&nonce_bytes);

        let cipher = XChaCha20Poly1305::new_from_slice(&self.encryption_key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let sealed = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed("aead encrypt failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(Ciphertext::new(out))
    }

    /// Decrypt a ciphertext produced by [`PairingKey::encrypt`].
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>, CryptoError> {
        let bytes = ciphertext.as_bytes();
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Truncated { len: bytes.len() });
        }
        let (nonce, sealed) = bytes.split_at(NONCE_SIZE);

        let cipher = XChaCha20Poly1305::new_from_slice(&self.encryption_key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        cipher
            .decrypt(XNonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

// Don't leak keys in debug output
impl std::fmt::Debug for PairingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PairingKey {{ encryption_key: [REDACTED] }}")
    }
}
