//! CryptoNote Base58 encoding/decoding.
//!
//! Unlike Bitcoin's Base58Check, CryptoNote splits the input into 8-byte
//! blocks and encodes each one independently into exactly 11 characters. A
//! trailing partial block maps to a shorter, fixed character count.
//! Addresses append a varint network tag in front of the payload and a
//! 4-byte Keccak-256 checksum behind it.

use crate::constants::CHECKSUM_SIZE;
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const BLOCK_BYTES: usize = 8;
const BLOCK_CHARS: usize = 11;

/// Characters produced for a block of `n` bytes (`n` = index).
const CHARS_FOR_BYTES: [usize; BLOCK_BYTES + 1] = [0, 2, 3, 5, 6, 7, 9, 10, 11];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Base58Error {
    #[error("invalid character '{0}' at position {1}")]
    InvalidCharacter(char, usize),

    #[error("invalid encoded length {0}")]
    InvalidLength(usize),

    #[error("block {0} overflows its byte width")]
    Overflow(usize),

    #[error("address too short ({0} bytes)")]
    AddressTooShort(usize),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("varint incomplete or too long")]
    Varint,
}

/// Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];
    keccak.update(data);
    keccak.finalize(&mut output);
    output
}

fn digit_value(ch: u8) -> Option<u64> {
    ALPHABET.iter().position(|&c| c == ch).map(|p| p as u64)
}

fn bytes_for_chars(chars: usize) -> Option<usize> {
    CHARS_FOR_BYTES.iter().position(|&c| c == chars)
}

fn encode_block(block: &[u8], out: &mut Vec<u8>) {
    let width = CHARS_FOR_BYTES[block.len()];
    let mut num = block.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

    let start = out.len();
    out.resize(start + width, ALPHABET[0]);
    for slot in out[start..].iter_mut().rev() {
        if num == 0 {
            break;
        }
        *slot = ALPHABET[(num % 58) as usize];
        num /= 58;
    }
}

fn decode_block(
    block: &[u8],
    offset: usize,
    block_index: usize,
    out: &mut Vec<u8>,
) -> Result<(), Base58Error> {
    let width = bytes_for_chars(block.len()).ok_or(Base58Error::InvalidLength(block.len()))?;

    let mut num: u128 = 0;
    for (i, &ch) in block.iter().enumerate() {
        let digit = digit_value(ch)
            .ok_or(Base58Error::InvalidCharacter(ch as char, offset + i))?;
        num = num * 58 + u128::from(digit);
    }

    if num >> (8 * width) != 0 {
        return Err(Base58Error::Overflow(block_index));
    }

    let bytes = (num as u64).to_be_bytes();
    out.extend_from_slice(&bytes[BLOCK_BYTES - width..]);
    Ok(())
}

/// Encode binary data to CryptoNote Base58.
pub fn encode(data: &[u8]) -> String {
    let mut out = Vec::with_capacity(data.len() / BLOCK_BYTES * BLOCK_CHARS + BLOCK_CHARS);
    for block in data.chunks(BLOCK_BYTES) {
        encode_block(block, &mut out);
    }
    // Every byte pushed comes from ALPHABET.
    out.into_iter().map(char::from).collect()
}

/// Decode a CryptoNote Base58 string to binary data.
pub fn decode(encoded: &str) -> Result<Vec<u8>, Base58Error> {
    let bytes = encoded.as_bytes();
    if bytes_for_chars(bytes.len() % BLOCK_CHARS).is_none() {
        return Err(Base58Error::InvalidLength(encoded.len()));
    }

    let mut out = Vec::with_capacity(bytes.len() / BLOCK_CHARS * BLOCK_BYTES + BLOCK_BYTES);
    for (index, block) in bytes.chunks(BLOCK_CHARS).enumerate() {
        decode_block(block, index * BLOCK_CHARS, index, &mut out)?;
    }
    Ok(out)
}

/// Encode a varint (LEB128 unsigned).
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            bytes.push(byte);
            return bytes;
        }
        bytes.push(byte | 0x80);
    }
}

/// Decode a varint from the start of data. Returns (value, bytes_read).
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize), Base58Error> {
    let mut value: u64 = 0;
    for (i, &byte) in data.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Base58Error::Varint)
}

/// Encode an address: varint tag, payload, then a Keccak-256 checksum.
pub fn encode_address(tag: u64, data: &[u8]) -> String {
    let mut buf = encode_varint(tag);
    buf.extend_from_slice(data);
    let checksum = keccak256(&buf);
    buf.extend_from_slice(&checksum[..CHECKSUM_SIZE]);
    encode(&buf)
}

/// Decode an address, verifying the checksum. Returns (tag, payload).
pub fn decode_address(address: &str) -> Result<(u64, Vec<u8>), Base58Error> {
    let decoded = decode(address)?;
    if decoded.len() <= CHECKSUM_SIZE {
        return Err(Base58Error::AddressTooShort(decoded.len()));
    }

    let (body, checksum) = decoded.split_at(decoded.len() - CHECKSUM_SIZE);
    if keccak256(body)[..CHECKSUM_SIZE] != *checksum {
        return Err(Base58Error::ChecksumMismatch);
    }

    let (tag, read) = decode_varint(body)?;
    Ok((tag, body[read..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_widths() {
        assert_eq!(encode(&[0u8; 8]).len(), 11);
        assert_eq!(encode(&[0u8; 9]).len(), 13);
        assert_eq!(encode(&[0xFF; 3]).len(), 5);
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(encode(&[0x00]), "11");
        assert_eq!(encode(&[0x39]), "1z");
        assert_eq!(encode(&[0xFF]), "5Q");
        assert_eq!(decode("5Q").unwrap(), vec![0xFF]);
    }

    #[test]
    fn test_varying_lengths_decode_back() {
        for len in [1usize, 7, 8, 31, 64, 69, 100] {
            let data: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
            assert_eq!(decode(&encode(&data)).unwrap(), data, "length {}", len);
        }
    }

    #[test]
    fn test_invalid_character() {
        let err = decode("0O").unwrap_err();
        assert_eq!(err, Base58Error::InvalidCharacter('0', 0));
    }

    #[test]
    fn test_invalid_length() {
        // A 1-character trailing block cannot encode any byte count.
        assert!(matches!(decode("1"), Err(Base58Error::InvalidLength(1))));
    }

    #[test]
    fn test_overflowing_partial_block() {
        // "zz" = 57*58+57 = 3363 > 255.
        assert_eq!(decode("zz").unwrap_err(), Base58Error::Overflow(0));
    }

    #[test]
    fn test_varint() {
        assert_eq!(encode_varint(0), vec![0]);
        assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
        assert_eq!(decode_varint(&[0xAC, 0x02, 0xFF]).unwrap(), (300, 2));
        assert_eq!(decode_varint(&[0x80]).unwrap_err(), Base58Error::Varint);
    }

    #[test]
    fn test_address_checksum() {
        let encoded = encode_address(0x1c9b12, &[0xAB; 64]);
        let (tag, data) = decode_address(&encoded).unwrap();
        assert_eq!(tag, 0x1c9b12);
        assert_eq!(data, vec![0xAB; 64]);

        let mut corrupted: Vec<char> = encoded.chars().collect();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == '2' { '3' } else { '2' };
        let corrupted: String = corrupted.into_iter().collect();
        assert!(decode_address(&corrupted).is_err());
    }
}
