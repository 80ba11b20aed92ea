// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Hex wire encoding for contract call arguments. The variant set is closed:
//! anything the pipeline does not know how to encode is a type error at the
//! call site, not a runtime fallback.

use alloy::primitives::{Bytes, B256};
use thiserror::Error;

/// A value headed for the wire, tagged by representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// 32-byte ciphertext handle.
    Handle([u8; 32]),
    /// Variable-length byte payload, e.g. an input proof.
    Bytes(Vec<u8>),
    /// Unsigned integer, encoded big-endian without leading zero bytes.
    Uint(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("hex string must carry a 0x prefix")]
    MissingPrefix,
    #[error("hex string has an odd number of digits")]
    OddLength,
    #[error("invalid hex digit: {0}")]
    InvalidDigit(String),
}

/// Lowercase `0x`-prefixed hex. Deterministic: byte order preserved, every
/// byte rendered as exactly two digits.
pub fn to_hex(value: &WireValue) -> String {
    match value {
        WireValue::Handle(bytes) => format!("0x{}", hex::encode(bytes)),
        WireValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        WireValue::Uint(v) => {
            let bytes = v.to_be_bytes();
            // Keep at least one byte so zero encodes as "0x00".
            let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
            format!("0x{}", hex::encode(&bytes[skip..]))
        }
    }
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, WireError> {
    let digits = s.strip_prefix("0x").ok_or(WireError::MissingPrefix)?;
    if digits.len() % 2 != 0 {
        return Err(WireError::OddLength);
    }
    hex::decode(digits).map_err(|e| WireError::InvalidDigit(e.to_string()))
}

pub fn handle_to_b256(handle: [u8; 32]) -> B256 {
    B256::from(handle)
}

pub fn proof_to_bytes(proof: Vec<u8>) -> Bytes {
    Bytes::from(proof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_encode_to_64_lowercase_digits() {
        let mut handle = [0u8; 32];
        handle[0] = 0xAB;
        handle[31] = 0x01;
        let encoded = to_hex(&WireValue::Handle(handle));
        assert_eq!(encoded.len(), 66);
        assert!(encoded.starts_with("0xab"));
        assert!(encoded.ends_with("01"));
        assert_eq!(encoded, encoded.to_lowercase());
    }

    #[test]
    fn encoding_round_trips() {
        let payload = vec![0x00, 0xff, 0x10, 0x0a];
        let encoded = to_hex(&WireValue::Bytes(payload.clone()));
        assert_eq!(encoded, "0x00ff100a");
        assert_eq!(decode_hex(&encoded).unwrap(), payload);
        // Deterministic on repeat.
        assert_eq!(encoded, to_hex(&WireValue::Bytes(payload)));
    }

    #[test]
    fn uints_drop_leading_zero_bytes_only() {
        assert_eq!(to_hex(&WireValue::Uint(0)), "0x00");
        assert_eq!(to_hex(&WireValue::Uint(0x0a)), "0x0a");
        assert_eq!(to_hex(&WireValue::Uint(0x1234)), "0x1234");
    }

    #[test]
    fn malformed_hex_is_a_hard_error() {
        assert_eq!(decode_hex("ff"), Err(WireError::MissingPrefix));
        assert_eq!(decode_hex("0xfff"), Err(WireError::OddLength));
        assert!(matches!(
            decode_hex("0xzz"),
            Err(WireError::InvalidDigit(_))
        ));
    }
}
