//! Payment IDs: 32-byte identifiers written as 64 hex characters.

use crate::constants::PAYMENT_ID_SIZE;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentIdError {
    #[error("payment ID must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("payment ID is not valid hex")]
    InvalidHex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentId([u8; PAYMENT_ID_SIZE]);

impl PaymentId {
    pub fn from_bytes(bytes: [u8; PAYMENT_ID_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PAYMENT_ID_SIZE] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for PaymentId {
    type Err = PaymentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != PAYMENT_ID_SIZE * 2 {
            return Err(PaymentIdError::InvalidLength {
                expected: PAYMENT_ID_SIZE * 2,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; PAYMENT_ID_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| PaymentIdError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Whether `s` is a well-formed payment ID. The empty string is not.
pub fn is_valid_payment_id(s: &str) -> bool {
    s.parse::<PaymentId>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let text = "ab".repeat(32);
        let pid: PaymentId = text.parse().unwrap();
        assert_eq!(pid.as_bytes(), &[0xAB; 32]);
        assert_eq!(pid.to_string(), text);
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let pid: PaymentId = "AB".repeat(32).parse().unwrap();
        assert_eq!(pid.to_hex(), "ab".repeat(32));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(
            "abcd".parse::<PaymentId>(),
            Err(PaymentIdError::InvalidLength { expected: 64, actual: 4 })
        );
        assert!(!is_valid_payment_id(""));
    }

    #[test]
    fn test_rejects_non_hex() {
        assert_eq!("zz".repeat(32).parse::<PaymentId>(), Err(PaymentIdError::InvalidHex));
    }
}
