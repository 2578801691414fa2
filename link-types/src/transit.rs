//! Ciphertext and its transit encoding.
//!
//! Ciphertexts cross the queue and push boundaries as standard (padded)
//! base64 text. This is the only on-wire format pairlink owns; everything
//! inside the ciphertext is opaque to the transport.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

use crate::TypesError;

/// An encrypted message payload.
///
/// Produced by a pairing's encryption capability and carried unchanged
/// through the relay.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    /// Wrap raw ciphertext bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a ciphertext from its transit representation.
    pub fn from_transit(text: &str) -> Result<Self, TypesError> {
        decode_transit(text).map(Self)
    }

    /// Encode this ciphertext for transit.
    pub fn to_transit(&self) -> String {
        encode_transit(&self.0)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Ciphertext {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Ciphertext {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.0.len())
    }
}

/// Encode bytes as standard base64 for queue or push transit.
pub fn encode_transit(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 transit text back into bytes.
pub fn decode_transit(text: &str) -> Result<Vec<u8>, TypesError> {
    STANDARD.decode(text).map_err(TypesError::InvalidTransit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transit_roundtrip_preserves_bytes() {
        let inputs: [&[u8]; 4] = [b"", b"a", b"hello relay", &[0u8, 255, 1, 254]];
        for input in inputs {
            let text = encode_transit(input);
            assert_eq!(decode_transit(&text).unwrap(), input);
        }
    }

    #[test]
    fn transit_roundtrip_large_input() {
        let input: Vec<u8> = (0..=255u8).cycle().take(256 * 1024 + 1).collect();
        let text = encode_transit(&input);
        assert_eq!(decode_transit(&text).unwrap(), input);
    }

    #[test]
    fn transit_uses_padded_standard_alphabet() {
        assert_eq!(encode_transit(b"\xfb\xff"), "+/8=");
        assert_eq!(encode_transit(b""), "");
    }

    #[test]
    fn malformed_transit_is_rejected() {
        for bad in ["not base64!", "abc", "@@@@", "QUJD=x"] {
            assert!(
                matches!(decode_transit(bad), Err(TypesError::InvalidTransit(_))),
                "{bad:?} should not decode"
            );
        }
    }

    #[test]
    fn ciphertext_transit_roundtrip() {
        let ct = Ciphertext::new(vec![1, 2, 3, 4, 5]);
        let back = Ciphertext::from_transit(&ct.to_transit()).unwrap();
        assert_eq!(back, ct);
        assert_eq!(back.len(), 5);
    }

    #[test]
    fn ciphertext_debug_hides_content() {
        let ct = Ciphertext::new(vec![0x42; 10]);
        assert_eq!(format!("{:?}", ct), "Ciphertext(10 bytes)");
    }
}
