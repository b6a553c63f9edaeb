//! # Node Header Layout
//!
//! Every B-tree vertex is a fixed 96-byte, 4-byte-aligned record embedded in
//! the buffer. The root node lives permanently at offset 0; nested objects
//! and arrays embed further nodes at their value positions.
//!
//! ## Header Layout (96 bytes)
//!
//! ```text
//! Offset  Size  Field        Description
//! ------  ----  -----------  ----------------------------------------
//! 0       4     gen_type     Low 8 bits: node type (OBJECT=6, ARRAY=7).
//!                            High 24 bits: generation counter (root only).
//! 4       28    hashes[7]    DJB2 hash per present key, sorted ascending.
//! 32      4     size_kc      Low 3 bits: key_count (0..=7).
//!                            Bits 6+: subtree entry count (root only).
//! 36      28    kv_ofs[7]    Buffer offset of each key/value payload.
//! 64      32    child_ofs[8] Child node offsets; child_ofs[0] == 0 marks
//!                            a leaf.
//! ```
//!
//! ## Bit-Field Discipline
//!
//! `gen_type` and `size_kc` each pack two fields into one 32-bit word. Every
//! setter masks and shifts so sibling fields of the same word are preserved;
//! `init` is the only operation that rewrites whole words.
//!
//! ## Zero-Copy Access
//!
//! The header is a `zerocopy` struct of little-endian `U32` words, so it can
//! be transmuted directly from any 96-byte buffer range without copying and
//! without alignment requirements on the host side.

use zerocopy::{
    byteorder::{LittleEndian, U32},
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
};

use crate::error::{Error, Result};

/// Size of a node header in bytes.
pub const NODE_SIZE: usize = 96;

/// Alignment of every node within the buffer.
pub const NODE_ALIGN: u32 = 4;

/// Maximum keys per node.
pub const MAX_KEYS: usize = 7;

/// Minimum keys per non-root node.
pub const MIN_KEYS: usize = 3;

/// Children per node: one more than the key slots.
pub const MAX_CHILDREN: usize = 8;

/// Maximum tree height; deeper descent signals corruption.
pub const MAX_DEPTH: usize = 9;

const TYPE_MASK: u32 = 0xFF;
const GENERATION_MASK: u32 = 0x00FF_FFFF;
const GENERATION_SHIFT: u32 = 8;
const KEY_COUNT_MASK: u32 = 0x07;
const SUBTREE_SIZE_SHIFT: u32 = 6;

/// The two container node types. The numeric values double as the value
/// type tags for nested values, so a node's first header byte is readable
/// as a type tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object = 6,
    Array = 7,
}

impl NodeType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            6 => Some(NodeType::Object),
            7 => Some(NodeType::Array),
            _ => None,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct NodeHeader {
    gen_type: U32<LittleEndian>,
    hashes: [U32<LittleEndian>; MAX_KEYS],
    size_kc: U32<LittleEndian>,
    kv_ofs: [U32<LittleEndian>; MAX_KEYS],
    child_ofs: [U32<LittleEndian>; MAX_CHILDREN],
}

impl NodeHeader {
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        if data.len() < NODE_SIZE {
            return Err(Error::out_of_bounds(format!(
                "buffer too small for node header: {} < {}",
                data.len(),
                NODE_SIZE
            )));
        }
        Self::ref_from_bytes(&data[..NODE_SIZE])
            .map_err(|e| Error::bad_message(format!("failed to read node header: {:?}", e)))
    }

    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
        if data.len() < NODE_SIZE {
            return Err(Error::out_of_bounds(format!(
                "buffer too small for node header: {} < {}",
                data.len(),
                NODE_SIZE
            )));
        }
        Self::mut_from_bytes(&mut data[..NODE_SIZE])
            .map_err(|e| Error::bad_message(format!("failed to read node header: {:?}", e)))
    }

    /// Rewrite the whole header for a fresh node of `node_type`: generation
    /// zero, no keys, zero subtree size, all children cleared.
    pub fn init(&mut self, node_type: NodeType) {
        self.gen_type = U32::new(node_type as u32);
        self.hashes = [U32::new(0); MAX_KEYS];
        self.size_kc = U32::new(0);
        self.kv_ofs = [U32::new(0); MAX_KEYS];
        self.child_ofs = [U32::new(0); MAX_CHILDREN];
    }

    pub fn node_type(&self) -> Option<NodeType> {
        NodeType::from_byte((self.gen_type.get() & TYPE_MASK) as u8)
    }

    pub fn type_byte(&self) -> u8 {
        (self.gen_type.get() & TYPE_MASK) as u8
    }

    pub fn generation(&self) -> u32 {
        self.gen_type.get() >> GENERATION_SHIFT
    }

    pub fn set_generation(&mut self, generation: u32) {
        let word = (self.gen_type.get() & TYPE_MASK)
            | ((generation & GENERATION_MASK) << GENERATION_SHIFT);
        self.gen_type = U32::new(word);
    }

    /// Increment the generation counter, wrapping mod 2^24.
    pub fn bump_generation(&mut self) {
        self.set_generation(self.generation().wrapping_add(1) & GENERATION_MASK);
    }

    pub fn key_count(&self) -> usize {
        (self.size_kc.get() & KEY_COUNT_MASK) as usize
    }

    pub fn set_key_count(&mut self, count: usize) {
        debug_assert!(count <= MAX_KEYS);
        let word = (self.size_kc.get() & !KEY_COUNT_MASK) | (count as u32 & KEY_COUNT_MASK);
        self.size_kc = U32::new(word);
    }

    /// Total entries in the subtree rooted here. Maintained only on nodes
    /// used as subtree roots.
    pub fn subtree_size(&self) -> u64 {
        (self.size_kc.get() >> SUBTREE_SIZE_SHIFT) as u64
    }

    pub fn set_subtree_size(&mut self, size: u64) {
        let word =
            (self.size_kc.get() & ((1 << SUBTREE_SIZE_SHIFT) - 1)) | ((size as u32) << SUBTREE_SIZE_SHIFT);
        self.size_kc = U32::new(word);
    }

    pub fn hash_at(&self, index: usize) -> u32 {
        debug_assert!(index < MAX_KEYS);
        self.hashes[index].get()
    }

    pub fn set_hash_at(&mut self, index: usize, hash: u32) {
        debug_assert!(index < MAX_KEYS);
        self.hashes[index] = U32::new(hash);
    }

    pub fn kv_ofs_at(&self, index: usize) -> u32 {
        debug_assert!(index < MAX_KEYS);
        self.kv_ofs[index].get()
    }

    pub fn set_kv_ofs_at(&mut self, index: usize, offset: u32) {
        debug_assert!(index < MAX_KEYS);
        self.kv_ofs[index] = U32::new(offset);
    }

    pub fn child_at(&self, index: usize) -> u32 {
        debug_assert!(index < MAX_CHILDREN);
        self.child_ofs[index].get()
    }

    pub fn set_child_at(&mut self, index: usize, offset: u32) {
        debug_assert!(index < MAX_CHILDREN);
        self.child_ofs[index] = U32::new(offset);
    }

    /// A zero in child slot 0 marks a leaf (the root itself is never a
    /// child, so offset 0 is unambiguous).
    pub fn is_leaf(&self) -> bool {
        self.child_ofs[0].get() == 0
    }
}
