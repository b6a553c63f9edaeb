//! # In-Order Traversal
//!
//! Iteration over a subtree yields entries by ascending hash, driven by an
//! explicit stack of `(node, next-entry)` frames: descend to the leftmost
//! leaf, then alternate between yielding the current entry and descending
//! into the right subtree of its slot. The stack never exceeds the tree
//! height, which is bounded by [`MAX_DEPTH`].
//!
//! ## Generation Fence
//!
//! The root's generation counter is captured when the iterator is built and
//! compared on every step. Any difference ends the iteration with an error
//! before a single stale entry is yielded. Exclusive borrows already prevent
//! in-process mutation mid-iteration; the fence also catches buffers whose
//! generation moved through any other channel, and it is the documented
//! cross-implementation contract of the format.

use smallvec::SmallVec;

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::node::{NodeType, MAX_DEPTH};
use crate::value::{decode_key, decode_value, value_offset, ValueRef};

/// One entry yielded by traversal. Object entries carry their decoded key;
/// array elements carry `None` and their hash is the element index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<'a> {
    pub key: Option<&'a str>,
    pub hash: u32,
    pub value: ValueRef<'a>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: u32,
    entry: usize,
}

/// In-order iterator over the entries of one subtree.
pub struct Entries<'a> {
    arena: &'a Arena,
    root: u32,
    generation: u32,
    keyed: bool,
    stack: SmallVec<[Frame; MAX_DEPTH]>,
    done: bool,
}

impl<'a> Entries<'a> {
    pub fn new(arena: &'a Arena, root: u32) -> Result<Self> {
        let node = arena.node(root)?;
        let node_type = node.node_type().ok_or_else(|| {
            Error::bad_message(format!(
                "offset {} does not hold a container node (type byte {})",
                root,
                node.type_byte()
            ))
        })?;
        let mut entries = Self {
            arena,
            root,
            generation: node.generation(),
            keyed: node_type == NodeType::Object,
            stack: SmallVec::new(),
            done: false,
        };
        entries.push_leftmost(root)?;
        Ok(entries)
    }

    fn push_leftmost(&mut self, mut node_ofs: u32) -> Result<()> {
        loop {
            if self.stack.len() >= MAX_DEPTH {
                return Err(Error::bad_message(format!(
                    "tree descent exceeded maximum depth {}",
                    MAX_DEPTH
                )));
            }
            self.stack.push(Frame {
                node: node_ofs,
                entry: 0,
            });
            let node = self.arena.node(node_ofs)?;
            if node.is_leaf() {
                return Ok(());
            }
            node_ofs = node.child_at(0);
        }
    }

    fn step(&mut self) -> Result<Option<Entry<'a>>> {
        let current = self.arena.node(self.root)?.generation();
        if current != self.generation {
            return Err(Error::invalid_argument(format!(
                "generation changed during iteration ({} -> {})",
                self.generation, current
            )));
        }

        while let Some(frame) = self.stack.last().copied() {
            let node = self.arena.node(frame.node)?;
            if frame.entry >= node.key_count() {
                self.stack.pop();
                continue;
            }

            let hash = node.hash_at(frame.entry);
            let kv_ofs = node.kv_ofs_at(frame.entry);
            let is_leaf = node.is_leaf();
            let right_child = if is_leaf {
                0
            } else {
                node.child_at(frame.entry + 1)
            };

            // INVARIANT: stack is non-empty, frame was just read from it
            self.stack.last_mut().unwrap().entry += 1;
            if !is_leaf {
                self.push_leftmost(right_child)?;
            }

            let bytes = self.arena.bytes();
            let key = if self.keyed {
                Some(decode_key(bytes, kv_ofs)?)
            } else {
                None
            };
            let val_ofs = value_offset(bytes, kv_ofs, self.keyed)?;
            let value = decode_value(bytes, val_ofs)?;
            return Ok(Some(Entry { key, hash, value }));
        }
        Ok(None)
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Keys of an object subtree, ascending by hash.
pub struct Keys<'a>(pub(crate) Entries<'a>);

impl<'a> Iterator for Keys<'a> {
    type Item = Result<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.0.next()? {
                Ok(entry) => match entry.key {
                    Some(key) => return Some(Ok(key)),
                    None => continue,
                },
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Values of a subtree, ascending by hash.
pub struct Values<'a>(pub(crate) Entries<'a>);

impl<'a> Iterator for Values<'a> {
    type Item = Result<ValueRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.next()? {
            Ok(entry) => Some(Ok(entry.value)),
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{djb2, encode_keytag, keytag_len, MAX_KEYTAG_SIZE};
    use crate::node::{NODE_ALIGN, NODE_SIZE};
    use crate::tree::{BTreeMut, InsertSlot};
    use crate::value::Scalar;

    fn new_root(node_type: NodeType) -> Arena {
        let mut arena = Arena::with_capacity(1024);
        arena.alloc_aligned(NODE_SIZE, NODE_ALIGN).unwrap();
        arena.node_mut(0).unwrap().init(node_type);
        arena
    }

    fn push_element(arena: &mut Arena, index: u32, scalar: Scalar<'_>) {
        let slot = BTreeMut::new(arena, 0).insert(index).unwrap();
        let InsertSlot::New { node, index: slot_index } = slot else {
            panic!("array index {} already present", index);
        };
        let size = scalar.encoded_size();
        let kv_ofs = arena.alloc(size).unwrap();
        scalar.encode(arena.slice_mut(kv_ofs, size).unwrap()).unwrap();
        arena.node_mut(node).unwrap().set_kv_ofs_at(slot_index, kv_ofs);
    }

    fn set_key(arena: &mut Arena, key: &str, scalar: Scalar<'_>) {
        let slot = BTreeMut::new(arena, 0).insert(djb2(key.as_bytes())).unwrap();
        let InsertSlot::New { node, index } = slot else {
            panic!("key {:?} already present", key);
        };
        let key_len = key.len() as u32 + 1;
        let payload_size = keytag_len(key_len) + key.len() + 1 + scalar.encoded_size();
        let kv_ofs = arena.alloc(payload_size).unwrap();
        let buf = arena.slice_mut(kv_ofs, payload_size).unwrap();
        let mut tag = [0u8; MAX_KEYTAG_SIZE];
        let tag_size = encode_keytag(key_len, &mut tag).unwrap();
        buf[..tag_size].copy_from_slice(&tag[..tag_size]);
        buf[tag_size..tag_size + key.len()].copy_from_slice(key.as_bytes());
        buf[tag_size + key.len()] = 0;
        scalar.encode(&mut buf[tag_size + key.len() + 1..]).unwrap();
        arena.node_mut(node).unwrap().set_kv_ofs_at(index, kv_ofs);
    }

    #[test]
    fn empty_subtree_yields_nothing() {
        let arena = new_root(NodeType::Object);
        let mut entries = Entries::new(&arena, 0).unwrap();
        assert!(entries.next().is_none());
        assert!(entries.next().is_none());
    }

    #[test]
    fn array_elements_come_back_in_index_order() {
        let mut arena = new_root(NodeType::Array);
        for i in 0..20u32 {
            push_element(&mut arena, i, Scalar::Int(i as i64 * 10));
        }
        let collected: Vec<Entry<'_>> = Entries::new(&arena, 0)
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(collected.len(), 20);
        for (i, entry) in collected.iter().enumerate() {
            assert_eq!(entry.key, None);
            assert_eq!(entry.hash, i as u32);
            assert_eq!(entry.value, ValueRef::Int(i as i64 * 10));
        }
    }

    #[test]
    fn object_entries_carry_decoded_keys() {
        let mut arena = new_root(NodeType::Object);
        set_key(&mut arena, "event", Scalar::Str("lap_complete"));
        set_key(&mut arena, "lap", Scalar::Int(55));
        set_key(&mut arena, "time_sec", Scalar::Float(88.427));

        let collected: Vec<Entry<'_>> = Entries::new(&arena, 0)
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        // Hash order: lap < event < time_sec.
        assert_eq!(
            collected.iter().map(|e| e.key.unwrap()).collect::<Vec<_>>(),
            vec!["lap", "event", "time_sec"]
        );
        assert_eq!(collected[0].value, ValueRef::Int(55));
        assert_eq!(collected[1].value, ValueRef::Str("lap_complete"));
        assert_eq!(collected[2].value, ValueRef::Float(88.427));

        let hashes: Vec<u32> = collected.iter().map(|e| e.hash).collect();
        let mut sorted = hashes.clone();
        sorted.sort_unstable();
        assert_eq!(hashes, sorted);
    }

    #[test]
    fn traversal_crosses_split_nodes_in_hash_order() {
        let mut arena = new_root(NodeType::Array);
        for i in 0..100u32 {
            push_element(&mut arena, i, Scalar::Null);
        }
        let hashes: Vec<u32> = Entries::new(&arena, 0)
            .unwrap()
            .map(|e| e.unwrap().hash)
            .collect();
        assert_eq!(hashes, (0..100).collect::<Vec<u32>>());
    }

    #[test]
    fn generation_mismatch_fails_fast() {
        let mut arena = new_root(NodeType::Array);
        for i in 0..5u32 {
            push_element(&mut arena, i, Scalar::Bool(true));
        }
        let mut entries = Entries::new(&arena, 0).unwrap();
        assert!(entries.next().unwrap().is_ok());

        // Simulate an iterator that outlived a mutation: its snapshot no
        // longer matches the root.
        entries.generation = entries.generation.wrapping_add(1);
        let err = entries.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(entries.next().is_none(), "iterator must fuse after the fence trips");
    }

    #[test]
    fn keys_and_values_adapters() {
        let mut arena = new_root(NodeType::Object);
        set_key(&mut arena, "a", Scalar::Int(1));
        set_key(&mut arena, "b", Scalar::Int(2));

        let keys: Vec<&str> = Keys(Entries::new(&arena, 0).unwrap())
            .map(|k| k.unwrap())
            .collect();
        assert_eq!(keys, vec!["a", "b"]);

        let values: Vec<ValueRef<'_>> = Values(Entries::new(&arena, 0).unwrap())
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(values, vec![ValueRef::Int(1), ValueRef::Int(2)]);
    }

    #[test]
    fn non_container_root_is_rejected() {
        let mut arena = Arena::with_capacity(NODE_SIZE);
        arena.alloc(NODE_SIZE).unwrap();
        // Type byte 0 is not a container.
        assert!(Entries::new(&arena, 0).is_err());
    }
}
