//! # Encoding Module
//!
//! Byte-level primitives for the buffer format:
//!
//! - **Scalar encoding**: bounds-checked little-endian read/write
//! - **Key hash**: DJB2 32-bit hash ordering the B-tree
//! - **Key tag**: variable-length (1-4 byte) key length prefix

pub mod hash;
pub mod keytag;
pub mod primitives;

pub use hash::djb2;
pub use keytag::{decode_keytag, encode_keytag, keytag_len, MAX_KEYTAG_SIZE};
pub use primitives::{
    align_offset, read_f64, read_i64, read_u32, read_u8, write_f64, write_i64, write_u32, write_u8,
};
