//! # Document Handle
//!
//! The single public handle over a Lite3 buffer. A `Document` owns the
//! arena and dispatches every high-level operation — typed sets, array
//! pushes, reads, enumeration, JSON projection — onto the B-tree engine and
//! the value codec.
//!
//! ## Lifecycle
//!
//! ```text
//! Document::new()            empty buffer, nothing at offset 0 yet
//!     │
//!     ▼
//! init_object()/init_array() root node written at offset 0
//!     │
//!     ▼
//! set_* / push_* / get / entries / to_json ...
//! ```
//!
//! `init_object`/`init_array` must run before any other operation; calling
//! either again re-initializes the root in place and abandons all previous
//! payload bytes.
//!
//! ## Offsets as Sub-Handles
//!
//! Nested containers are addressed by the node offset returned when they
//! were created (`set_object`, `push_array`, or a read's
//! `ValueRef::Object`/`Array`). Each such node is the root of its own
//! subtree and maintains its own generation counter and entry count, so
//! every operation here takes the subtree root offset it applies to; the
//! outermost root is [`ROOT`].
//!
//! ## Mutation Discipline
//!
//! Every mutation first validates its arguments, then reserves worst-case
//! space (payload plus two aligned node splits), then bumps the target
//! root's generation exactly once, and only then walks the tree. Space is
//! always reserved before the first byte of a region is written, so a
//! failed call never leaves a partial payload behind.
//!
//! ## Concurrency
//!
//! A `Document` is single-threaded: `&mut self` on every mutation gives the
//! "one writer at a time" discipline for free, and reads borrow the buffer
//! shared. Independent documents need no coordination.

use hashbrown::HashMap;

use crate::arena::Arena;
use crate::encoding::{align_offset, djb2, encode_keytag, keytag_len};
use crate::error::{Error, Result};
use crate::iter::{Entries, Keys, Values};
use crate::json::{escape_json_string, format_json_bytes, format_json_float};
use crate::node::{NodeType, NODE_ALIGN, NODE_SIZE};
use crate::tree::{BTree, BTreeMut, InsertSlot};
use crate::value::{
    decode_value, in_place_size, value_offset, Scalar, Value, ValueRef, TYPE_ARRAY, TYPE_OBJECT,
};

/// Offset of the outermost root node.
pub const ROOT: u32 = 0;

/// Default initial buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Worst-case bytes two splits can consume: two aligned node allocations.
const SPLIT_MARGIN: usize = 2 * (NODE_SIZE + NODE_ALIGN as usize - 1);

/// A Lite3 document: one contiguous buffer holding an in-place B-tree.
#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
        }
    }

    /// Wrap bytes produced by another handle (`buffer()` on the producer).
    /// The bytes are trusted as-is: no structural validation happens here,
    /// and malformed input surfaces later from the bounds-checked reads.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            arena: Arena::from_bytes(bytes),
        }
    }

    /// The used bytes: this *is* the serialized document.
    pub fn buffer(&self) -> &[u8] {
        self.arena.bytes()
    }

    /// Used buffer length in bytes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    // ---- initialization ------------------------------------------------

    /// Write an object root at offset 0. Calling this (or `init_array`) on
    /// an initialized handle re-initializes the root in place; previously
    /// appended payloads become dead bytes.
    pub fn init_object(&mut self) -> Result<()> {
        self.init_root(NodeType::Object)
    }

    /// Write an array root at offset 0.
    pub fn init_array(&mut self) -> Result<()> {
        self.init_root(NodeType::Array)
    }

    fn init_root(&mut self, node_type: NodeType) -> Result<()> {
        if self.arena.is_empty() {
            let offset = self.arena.alloc_aligned(NODE_SIZE, NODE_ALIGN)?;
            debug_assert_eq!(offset, ROOT);
        } else if self.arena.len() < NODE_SIZE {
            return Err(Error::out_of_bounds(format!(
                "buffer of {} bytes cannot hold a {}-byte root node",
                self.arena.len(),
                NODE_SIZE
            )));
        }
        self.arena.node_mut(ROOT)?.init(node_type);
        Ok(())
    }

    // ---- typed setters (object entries) --------------------------------

    pub fn set_null(&mut self, offset: u32, key: &str) -> Result<()> {
        self.set_scalar(offset, key, Scalar::Null)
    }

    pub fn set_bool(&mut self, offset: u32, key: &str, value: bool) -> Result<()> {
        self.set_scalar(offset, key, Scalar::Bool(value))
    }

    pub fn set_i64(&mut self, offset: u32, key: &str, value: i64) -> Result<()> {
        self.set_scalar(offset, key, Scalar::Int(value))
    }

    pub fn set_f64(&mut self, offset: u32, key: &str, value: f64) -> Result<()> {
        self.set_scalar(offset, key, Scalar::Float(value))
    }

    pub fn set_str(&mut self, offset: u32, key: &str, value: &str) -> Result<()> {
        self.set_scalar(offset, key, Scalar::Str(value))
    }

    pub fn set_bytes(&mut self, offset: u32, key: &str, value: &[u8]) -> Result<()> {
        self.set_scalar(offset, key, Scalar::Bytes(value))
    }

    /// Set a nested object under `key`, returning the new node's offset.
    /// If the key already holds an object or array, that node is
    /// re-initialized in place and its previous contents are discarded.
    pub fn set_object(&mut self, offset: u32, key: &str) -> Result<u32> {
        self.set_container(offset, key, NodeType::Object)
    }

    /// Set a nested array under `key`; see [`Document::set_object`].
    pub fn set_array(&mut self, offset: u32, key: &str) -> Result<u32> {
        self.set_container(offset, key, NodeType::Array)
    }

    /// Generic set: dispatch on the runtime-typed [`Value`]. Sequences
    /// become arrays with every element appended; mappings become objects
    /// with every pair set.
    pub fn set(&mut self, offset: u32, key: &str, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.set_null(offset, key),
            Value::Bool(v) => self.set_bool(offset, key, *v),
            Value::Int(v) => self.set_i64(offset, key, *v),
            Value::Float(v) => self.set_f64(offset, key, *v),
            Value::Str(v) => self.set_str(offset, key, v),
            Value::Bytes(v) => self.set_bytes(offset, key, v),
            Value::Array(elements) => {
                let child = self.set_array(offset, key)?;
                for element in elements {
                    self.push(child, element)?;
                }
                Ok(())
            }
            Value::Object(entries) => {
                let child = self.set_object(offset, key)?;
                for (k, v) in entries {
                    self.set(child, k, v)?;
                }
                Ok(())
            }
        }
    }

    // ---- array appends --------------------------------------------------

    pub fn push_null(&mut self, offset: u32) -> Result<()> {
        self.push_scalar(offset, Scalar::Null)
    }

    pub fn push_bool(&mut self, offset: u32, value: bool) -> Result<()> {
        self.push_scalar(offset, Scalar::Bool(value))
    }

    pub fn push_i64(&mut self, offset: u32, value: i64) -> Result<()> {
        self.push_scalar(offset, Scalar::Int(value))
    }

    pub fn push_f64(&mut self, offset: u32, value: f64) -> Result<()> {
        self.push_scalar(offset, Scalar::Float(value))
    }

    pub fn push_str(&mut self, offset: u32, value: &str) -> Result<()> {
        self.push_scalar(offset, Scalar::Str(value))
    }

    pub fn push_bytes(&mut self, offset: u32, value: &[u8]) -> Result<()> {
        self.push_scalar(offset, Scalar::Bytes(value))
    }

    /// Append a nested object to the array, returning the node offset.
    pub fn push_object(&mut self, offset: u32) -> Result<u32> {
        self.push_container(offset, NodeType::Object)
    }

    /// Append a nested array to the array, returning the node offset.
    pub fn push_array(&mut self, offset: u32) -> Result<u32> {
        self.push_container(offset, NodeType::Array)
    }

    /// Generic append: dispatch on the runtime-typed [`Value`].
    pub fn push(&mut self, offset: u32, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.push_null(offset),
            Value::Bool(v) => self.push_bool(offset, *v),
            Value::Int(v) => self.push_i64(offset, *v),
            Value::Float(v) => self.push_f64(offset, *v),
            Value::Str(v) => self.push_str(offset, v),
            Value::Bytes(v) => self.push_bytes(offset, v),
            Value::Array(elements) => {
                let child = self.push_array(offset)?;
                for element in elements {
                    self.push(child, element)?;
                }
                Ok(())
            }
            Value::Object(entries) => {
                let child = self.push_object(offset)?;
                for (k, v) in entries {
                    self.set(child, k, v)?;
                }
                Ok(())
            }
        }
    }

    // ---- reads -----------------------------------------------------------

    /// Look up `key` in the object rooted at `offset`. Missing keys are
    /// `None`; a stored NULL comes back as `ValueRef::Null`.
    pub fn get(&self, offset: u32, key: &str) -> Result<Option<ValueRef<'_>>> {
        self.container_at(offset, NodeType::Object)?;
        let hash = djb2(key.as_bytes());
        self.get_by_hash(offset, hash, true)
    }

    /// Look up element `index` in the array rooted at `offset`.
    pub fn get_at(&self, offset: u32, index: u32) -> Result<Option<ValueRef<'_>>> {
        self.container_at(offset, NodeType::Array)?;
        self.get_by_hash(offset, index, false)
    }

    /// Descend through nested objects along `path`.
    pub fn get_path(&self, offset: u32, path: &[&str]) -> Result<Option<ValueRef<'_>>> {
        let Some((first, rest)) = path.split_first() else {
            return Err(Error::invalid_argument("empty path"));
        };
        let mut current = self.get(offset, first)?;
        for key in rest {
            match current {
                Some(ValueRef::Object(node_ofs)) => {
                    current = self.get(node_ofs, key)?;
                }
                _ => return Ok(None),
            }
        }
        Ok(current)
    }

    fn get_by_hash(&self, offset: u32, hash: u32, keyed: bool) -> Result<Option<ValueRef<'_>>> {
        match BTree::new(&self.arena, offset).find(hash)? {
            None => Ok(None),
            Some((node, index)) => {
                let kv_ofs = self.arena.node(node)?.kv_ofs_at(index);
                let val_ofs = value_offset(self.arena.bytes(), kv_ofs, keyed)?;
                Ok(Some(decode_value(self.arena.bytes(), val_ofs)?))
            }
        }
    }

    pub fn has(&self, offset: u32, key: &str) -> Result<bool> {
        self.container_at(offset, NodeType::Object)?;
        let hash = djb2(key.as_bytes());
        Ok(BTree::new(&self.arena, offset).find(hash)?.is_some())
    }

    /// Number of entries in the subtree rooted at `offset`.
    pub fn size(&self, offset: u32) -> Result<u64> {
        self.any_container_at(offset)?;
        Ok(self.arena.node(offset)?.subtree_size())
    }

    /// Container type of the node at `offset`.
    pub fn node_type(&self, offset: u32) -> Result<NodeType> {
        self.any_container_at(offset)
    }

    pub fn get_bool(&self, offset: u32, key: &str) -> Result<Option<bool>> {
        match self.get(offset, key)? {
            None => Ok(None),
            Some(ValueRef::Bool(v)) => Ok(Some(v)),
            Some(other) => Err(type_mismatch(key, "a bool", &other)),
        }
    }

    /// Wide integer read: any stored I64.
    pub fn get_i64(&self, offset: u32, key: &str) -> Result<Option<i64>> {
        match self.get(offset, key)? {
            None => Ok(None),
            Some(ValueRef::Int(v)) => Ok(Some(v)),
            Some(other) => Err(type_mismatch(key, "an integer", &other)),
        }
    }

    /// Narrow integer read: fails on values outside ±(2^53 - 1).
    pub fn get_int(&self, offset: u32, key: &str) -> Result<Option<i64>> {
        match self.get(offset, key)? {
            None => Ok(None),
            Some(value @ ValueRef::Int(_)) => value.as_safe_i64().map(Some),
            Some(other) => Err(type_mismatch(key, "an integer", &other)),
        }
    }

    pub fn get_f64(&self, offset: u32, key: &str) -> Result<Option<f64>> {
        match self.get(offset, key)? {
            None => Ok(None),
            Some(ValueRef::Float(v)) => Ok(Some(v)),
            Some(other) => Err(type_mismatch(key, "a float", &other)),
        }
    }

    pub fn get_str(&self, offset: u32, key: &str) -> Result<Option<&str>> {
        match self.get(offset, key)? {
            None => Ok(None),
            Some(ValueRef::Str(v)) => Ok(Some(v)),
            Some(other) => Err(type_mismatch(key, "a string", &other)),
        }
    }

    pub fn get_bytes(&self, offset: u32, key: &str) -> Result<Option<&[u8]>> {
        match self.get(offset, key)? {
            None => Ok(None),
            Some(ValueRef::Bytes(v)) => Ok(Some(v)),
            Some(other) => Err(type_mismatch(key, "a byte sequence", &other)),
        }
    }

    // ---- enumeration -----------------------------------------------------

    /// In-order entries of the subtree at `offset`, ascending by hash.
    pub fn entries(&self, offset: u32) -> Result<Entries<'_>> {
        self.any_container_at(offset)?;
        Entries::new(&self.arena, offset)
    }

    /// Keys of the object at `offset`, ascending by hash — *not* insertion
    /// order; callers that need a particular order must sort externally.
    pub fn keys(&self, offset: u32) -> Result<Keys<'_>> {
        self.container_at(offset, NodeType::Object)?;
        Ok(Keys(Entries::new(&self.arena, offset)?))
    }

    pub fn values(&self, offset: u32) -> Result<Values<'_>> {
        self.any_container_at(offset)?;
        Ok(Values(Entries::new(&self.arena, offset)?))
    }

    // ---- JSON bridge ------------------------------------------------------

    /// Project the subtree at `offset` into an owned [`Value`] tree.
    pub fn to_json(&self, offset: u32) -> Result<Value> {
        match self.any_container_at(offset)? {
            NodeType::Object => {
                let mut map = HashMap::new();
                for entry in self.entries(offset)? {
                    let entry = entry?;
                    let key = entry.key.ok_or_else(|| {
                        Error::bad_message("object entry without a key")
                    })?;
                    map.insert(key.to_string(), self.value_to_json(entry.value)?);
                }
                Ok(Value::Object(map))
            }
            NodeType::Array => {
                let mut elements = Vec::new();
                for entry in self.entries(offset)? {
                    elements.push(self.value_to_json(entry?.value)?);
                }
                Ok(Value::Array(elements))
            }
        }
    }

    fn value_to_json(&self, value: ValueRef<'_>) -> Result<Value> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Bool(v) => Value::Bool(v),
            ValueRef::Int(v) => Value::Int(v),
            ValueRef::Float(v) => Value::Float(v),
            ValueRef::Str(v) => Value::Str(v.to_string()),
            ValueRef::Bytes(v) => Value::Bytes(v.to_vec()),
            ValueRef::Object(node_ofs) | ValueRef::Array(node_ofs) => self.to_json(node_ofs)?,
        })
    }

    /// Build a fresh document from an owned [`Value`] tree. The root must
    /// be an object or array.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut doc = Document::new();
        match value {
            Value::Object(entries) => {
                doc.init_object()?;
                for (k, v) in entries {
                    doc.set(ROOT, k, v)?;
                }
            }
            Value::Array(elements) => {
                doc.init_array()?;
                for element in elements {
                    doc.push(ROOT, element)?;
                }
            }
            other => {
                return Err(Error::invalid_argument(format!(
                    "from_json root must be an object or array, got {:?}",
                    other
                )))
            }
        }
        Ok(doc)
    }

    /// Render the subtree at `offset` as JSON text, walking the buffer
    /// directly. Object keys render in hash order.
    pub fn to_json_string(&self, offset: u32) -> Result<String> {
        match self.any_container_at(offset)? {
            NodeType::Object => {
                let mut result = String::from("{");
                let mut first = true;
                for entry in self.entries(offset)? {
                    let entry = entry?;
                    let key = entry.key.ok_or_else(|| {
                        Error::bad_message("object entry without a key")
                    })?;
                    if !first {
                        result.push(',');
                    }
                    first = false;
                    result.push_str(&escape_json_string(key));
                    result.push(':');
                    result.push_str(&self.render_value(entry.value)?);
                }
                result.push('}');
                Ok(result)
            }
            NodeType::Array => {
                let mut result = String::from("[");
                let mut first = true;
                for entry in self.entries(offset)? {
                    if !first {
                        result.push(',');
                    }
                    first = false;
                    result.push_str(&self.render_value(entry?.value)?);
                }
                result.push(']');
                Ok(result)
            }
        }
    }

    fn render_value(&self, value: ValueRef<'_>) -> Result<String> {
        Ok(match value {
            ValueRef::Null => "null".to_string(),
            ValueRef::Bool(v) => if v { "true" } else { "false" }.to_string(),
            ValueRef::Int(v) => v.to_string(),
            ValueRef::Float(v) => format_json_float(v),
            ValueRef::Str(v) => escape_json_string(v),
            ValueRef::Bytes(v) => format_json_bytes(v),
            ValueRef::Object(node_ofs) | ValueRef::Array(node_ofs) => {
                self.to_json_string(node_ofs)?
            }
        })
    }

    // ---- internals ---------------------------------------------------------

    fn set_scalar(&mut self, offset: u32, key: &str, scalar: Scalar<'_>) -> Result<()> {
        self.container_at(offset, NodeType::Object)?;
        check_key_len(key)?;
        let hash = djb2(key.as_bytes());
        let payload = keyed_payload_size(key, scalar.encoded_size());
        self.arena.ensure_space(payload + SPLIT_MARGIN)?;
        self.arena.node_mut(offset)?.bump_generation();

        match BTreeMut::new(&mut self.arena, offset).insert(hash)? {
            InsertSlot::New { node, index } => {
                let kv_ofs = self.append_keyed_scalar(key, scalar)?;
                self.arena.node_mut(node)?.set_kv_ofs_at(index, kv_ofs);
                self.bump_size(offset)?;
            }
            InsertSlot::Existing { node, index } => {
                let kv_ofs = self.arena.node(node)?.kv_ofs_at(index);
                let val_ofs = value_offset(self.arena.bytes(), kv_ofs, true)?;
                let old = in_place_size(self.arena.bytes(), val_ofs)?;
                let new = scalar.encoded_size();
                if new <= old {
                    scalar.encode(self.arena.slice_mut(val_ofs, new)?)?;
                } else {
                    let kv_ofs = self.append_keyed_scalar(key, scalar)?;
                    self.arena.node_mut(node)?.set_kv_ofs_at(index, kv_ofs);
                }
            }
        }
        Ok(())
    }

    fn set_container(&mut self, offset: u32, key: &str, node_type: NodeType) -> Result<u32> {
        self.container_at(offset, NodeType::Object)?;
        check_key_len(key)?;
        let hash = djb2(key.as_bytes());
        let payload = keyed_payload_size(key, NODE_ALIGN as usize - 1 + NODE_SIZE);
        self.arena.ensure_space(payload + SPLIT_MARGIN)?;
        self.arena.node_mut(offset)?.bump_generation();

        match BTreeMut::new(&mut self.arena, offset).insert(hash)? {
            InsertSlot::New { node, index } => {
                let (kv_ofs, node_ofs) = self.append_keyed_node(key, node_type)?;
                self.arena.node_mut(node)?.set_kv_ofs_at(index, kv_ofs);
                self.bump_size(offset)?;
                Ok(node_ofs)
            }
            InsertSlot::Existing { node, index } => {
                let kv_ofs = self.arena.node(node)?.kv_ofs_at(index);
                let val_ofs = value_offset(self.arena.bytes(), kv_ofs, true)?;
                let tag = self.arena.slice(val_ofs, 1)?[0];
                if tag == TYPE_OBJECT || tag == TYPE_ARRAY {
                    // In-place clear: re-initialize the embedded node,
                    // keeping its offset; retag any alignment gap bytes.
                    let node_ofs = align_offset(val_ofs, NODE_ALIGN);
                    let gap = (node_ofs - val_ofs) as usize;
                    self.arena
                        .slice_mut(val_ofs, gap)?
                        .fill(node_type as u8);
                    self.arena.node_mut(node_ofs)?.init(node_type);
                    Ok(node_ofs)
                } else {
                    let (kv_ofs, node_ofs) = self.append_keyed_node(key, node_type)?;
                    self.arena.node_mut(node)?.set_kv_ofs_at(index, kv_ofs);
                    Ok(node_ofs)
                }
            }
        }
    }

    fn push_scalar(&mut self, offset: u32, scalar: Scalar<'_>) -> Result<()> {
        self.container_at(offset, NodeType::Array)?;
        let index = self.arena.node(offset)?.subtree_size() as u32;
        self.arena
            .ensure_space(scalar.encoded_size() + SPLIT_MARGIN)?;
        self.arena.node_mut(offset)?.bump_generation();

        match BTreeMut::new(&mut self.arena, offset).insert(index)? {
            InsertSlot::New { node, index: slot } => {
                let size = scalar.encoded_size();
                let kv_ofs = self.arena.alloc(size)?;
                scalar.encode(self.arena.slice_mut(kv_ofs, size)?)?;
                self.arena.node_mut(node)?.set_kv_ofs_at(slot, kv_ofs);
                self.bump_size(offset)?;
                Ok(())
            }
            InsertSlot::Existing { .. } => Err(Error::bad_message(format!(
                "array index {} already present; size counter out of sync",
                index
            ))),
        }
    }

    fn push_container(&mut self, offset: u32, node_type: NodeType) -> Result<u32> {
        self.container_at(offset, NodeType::Array)?;
        let index = self.arena.node(offset)?.subtree_size() as u32;
        self.arena
            .ensure_space(NODE_ALIGN as usize - 1 + NODE_SIZE + SPLIT_MARGIN)?;
        self.arena.node_mut(offset)?.bump_generation();

        match BTreeMut::new(&mut self.arena, offset).insert(index)? {
            InsertSlot::New { node, index: slot } => {
                let node_ofs = self.arena.alloc_aligned(NODE_SIZE, NODE_ALIGN)?;
                self.arena.node_mut(node_ofs)?.init(node_type);
                self.arena.node_mut(node)?.set_kv_ofs_at(slot, node_ofs);
                self.bump_size(offset)?;
                Ok(node_ofs)
            }
            InsertSlot::Existing { .. } => Err(Error::bad_message(format!(
                "array index {} already present; size counter out of sync",
                index
            ))),
        }
    }

    /// Append `key_tag ‖ key ‖ NUL ‖ type_tag ‖ data` at the tail.
    fn append_keyed_scalar(&mut self, key: &str, scalar: Scalar<'_>) -> Result<u32> {
        let total = keyed_payload_size(key, scalar.encoded_size());
        let kv_ofs = self.arena.alloc(total)?;
        let buf = self.arena.slice_mut(kv_ofs, total)?;
        let tag_size = encode_keytag(key.len() as u32 + 1, buf)?;
        buf[tag_size..tag_size + key.len()].copy_from_slice(key.as_bytes());
        buf[tag_size + key.len()] = 0;
        scalar.encode(&mut buf[tag_size + key.len() + 1..])?;
        Ok(kv_ofs)
    }

    /// Append `key_tag ‖ key ‖ NUL`, then a fresh node at the next aligned
    /// offset, filling any gap bytes with the node's type byte so the value
    /// position reads as a type tag.
    fn append_keyed_node(&mut self, key: &str, node_type: NodeType) -> Result<(u32, u32)> {
        let key_total = keytag_len(key.len() as u32 + 1) + key.len() + 1;
        let kv_ofs = self.arena.alloc(key_total)?;
        {
            let buf = self.arena.slice_mut(kv_ofs, key_total)?;
            let tag_size = encode_keytag(key.len() as u32 + 1, buf)?;
            buf[tag_size..tag_size + key.len()].copy_from_slice(key.as_bytes());
            buf[tag_size + key.len()] = 0;
        }
        let val_ofs = kv_ofs + key_total as u32;
        let node_ofs = self.arena.alloc_aligned(NODE_SIZE, NODE_ALIGN)?;
        let gap = (node_ofs - val_ofs) as usize;
        self.arena.slice_mut(val_ofs, gap)?.fill(node_type as u8);
        self.arena.node_mut(node_ofs)?.init(node_type);
        Ok((kv_ofs, node_ofs))
    }

    fn bump_size(&mut self, offset: u32) -> Result<()> {
        let node = self.arena.node_mut(offset)?;
        let size = node.subtree_size();
        node.set_subtree_size(size + 1);
        Ok(())
    }

    fn container_at(&self, offset: u32, expected: NodeType) -> Result<()> {
        let found = self.any_container_at(offset)?;
        if found != expected {
            return Err(Error::invalid_argument(format!(
                "node at offset {} is {:?}, expected {:?}",
                offset, found, expected
            )));
        }
        Ok(())
    }

    fn any_container_at(&self, offset: u32) -> Result<NodeType> {
        if self.arena.len() < NODE_SIZE {
            return Err(Error::invalid_argument(
                "handle not initialized; call init_object or init_array first",
            ));
        }
        let node = self.arena.node(offset)?;
        node.node_type().ok_or_else(|| {
            Error::invalid_argument(format!(
                "offset {} does not hold a container node (type byte {})",
                offset,
                node.type_byte()
            ))
        })
    }
}

fn type_mismatch(key: &str, expected: &str, found: &ValueRef<'_>) -> Error {
    Error::invalid_argument(format!(
        "key {:?} holds {:?}, expected {}",
        key, found, expected
    ))
}

fn check_key_len(key: &str) -> Result<()> {
    if key.len() as u64 + 1 > crate::encoding::keytag::MAX_KEY_LEN as u64 {
        return Err(Error::invalid_argument(format!(
            "key of {} bytes exceeds the maximum encodable length",
            key.len()
        )));
    }
    Ok(())
}

fn keyed_payload_size(key: &str, value_size: usize) -> usize {
    keytag_len(key.len() as u32 + 1) + key.len() + 1 + value_size
}
