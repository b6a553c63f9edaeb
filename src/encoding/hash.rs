//! # DJB2 Key Hash
//!
//! Keys are ordered in the B-tree by their DJB2 32-bit hash: starting from
//! seed 5381, each byte `b` folds in as `h = h * 33 + b` (mod 2^32). The
//! hash is computed over the UTF-8 bytes of the key, excluding the NUL
//! terminator that is stored on the wire.
//!
//! ## Collisions
//!
//! DJB2 is not collision-free over 32 bits and the core does not resolve
//! collisions: two distinct keys with equal hashes are indistinguishable and
//! the later write overwrites the earlier. This is a deliberate, documented
//! limitation of the format — callers that cannot tolerate it must screen
//! their key sets externally.

/// DJB2 seed value.
pub const DJB2_SEED: u32 = 5381;

/// Hash `bytes` with DJB2 (multiply-by-33, seed 5381), mod 2^32.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    let mut hash = DJB2_SEED;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b as u32);
    }
    hash
}
