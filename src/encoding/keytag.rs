//! # Variable-Length Key Tag
//!
//! Every object key on the wire is prefixed with a key tag: a 1-4 byte
//! little-endian varuint whose two least-significant bits encode
//! `tag_size - 1` and whose remaining bits encode the key byte length
//! *including* the trailing NUL terminator.
//!
//! ## Encoding Format
//!
//! | Key length (with NUL) | Tag bytes | Payload bits |
//! |-----------------------|-----------|--------------|
//! | 0 - 63                | 1         | 6            |
//! | 64 - 16383            | 2         | 14           |
//! | 16384 - 4194303       | 3         | 22           |
//! | 4194304 - 2^30 - 1    | 4         | 30           |
//!
//! The tag value is `(len << 2) | (tag_size - 1)`, written little-endian in
//! `tag_size` bytes. The smallest size that fits is always chosen, so the
//! encoding is canonical and `decode(encode(len)) == len` for every
//! representable length.
//!
//! ## Boundary Values
//!
//! Key boundary values for testing: 63 (max 1-byte), 64 (min 2-byte),
//! 16383/16384, 4194303/4194304, and the 2^30 - 1 ceiling.

use crate::error::{Error, Result};

/// Largest key tag in bytes.
pub const MAX_KEYTAG_SIZE: usize = 4;

/// Largest encodable key length (including NUL): 30 payload bits.
pub const MAX_KEY_LEN: u32 = (1 << 30) - 1;

/// Number of tag bytes needed for a key of `len` bytes (including NUL).
pub fn keytag_len(len: u32) -> usize {
    if len <= 63 {
        1
    } else if len <= 16_383 {
        2
    } else if len <= 4_194_303 {
        3
    } else {
        4
    }
}

/// Encode a key length (including NUL) into `buf`, returning the number of
/// tag bytes written. `buf` must hold at least `keytag_len(len)` bytes.
pub fn encode_keytag(len: u32, buf: &mut [u8]) -> Result<usize> {
    if len > MAX_KEY_LEN {
        return Err(Error::invalid_argument(format!(
            "key length {} exceeds maximum {}",
            len, MAX_KEY_LEN
        )));
    }
    let size = keytag_len(len);
    if buf.len() < size {
        return Err(Error::out_of_bounds(format!(
            "key tag needs {} bytes, buffer has {}",
            size,
            buf.len()
        )));
    }
    let tag = (len << 2) | (size as u32 - 1);
    let bytes = tag.to_le_bytes();
    buf[..size].copy_from_slice(&bytes[..size]);
    Ok(size)
}

/// Decode a key tag from the front of `buf`, returning
/// `(key_len_with_nul, tag_size)`.
pub fn decode_keytag(buf: &[u8]) -> Result<(u32, usize)> {
    let first = *buf
        .first()
        .ok_or_else(|| Error::bad_message("empty buffer for key tag decode"))?;
    let size = (first & 0x03) as usize + 1;
    if buf.len() < size {
        return Err(Error::bad_message(format!(
            "truncated {}-byte key tag",
            size
        )));
    }
    let mut bytes = [0u8; 4];
    bytes[..size].copy_from_slice(&buf[..size]);
    let tag = u32::from_le_bytes(bytes);
    Ok((tag >> 2, size))
}
