//! # Lite3 - In-Place Binary JSON
//!
//! Lite3 is a JSON-compatible binary serialization format whose defining
//! property is that the encoded representation IS the working
//! representation: a document lives in a single contiguous byte buffer
//! organized as an in-place B-tree, and any field can be read or mutated in
//! O(log n) without unpacking.
//!
//! ## Quick Start
//!
//! ```
//! use lite3::{Document, ROOT};
//!
//! let mut doc = Document::new();
//! doc.init_object()?;
//! doc.set_str(ROOT, "event", "lap_complete")?;
//! doc.set_i64(ROOT, "lap", 55)?;
//! doc.set_f64(ROOT, "time_sec", 88.427)?;
//!
//! assert_eq!(doc.get_i64(ROOT, "lap")?, Some(55));
//!
//! // The buffer is the wire format; no serialization step exists.
//! let copy = lite3::Document::from_bytes(doc.buffer());
//! assert_eq!(copy.get_str(ROOT, "event")?, Some("lap_complete"));
//! # Ok::<(), lite3::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------+
//! |        Document (facade)            |  set/get/push/to_json
//! +------------------+------------------+
//! |   Value codec    |    Traversal     |  tags, in-place sizes, iterators
//! +------------------+------------------+
//! |            B-tree engine            |  find, insert, split
//! +-------------------------------------+
//! |   Node accessors (96-byte header)   |  bit-packed fields, zerocopy
//! +-------------------------------------+
//! |  Buffer arena + byte primitives     |  bump allocation, LE scalars
//! +-------------------------------------+
//! ```
//!
//! ## Buffer Layout
//!
//! Offset 0 always holds the root node; payloads and nested nodes are
//! appended at the tail and never reclaimed. All offsets are 32-bit, all
//! scalars little-endian, and the byte image is memcpy-portable: the same
//! bytes are valid in any Lite3 implementation.
//!
//! ## Ordering and Collisions
//!
//! Object keys are ordered by their DJB2 32-bit hash, not by insertion
//! order, and hash collisions are not resolved — two colliding keys alias
//! the same entry, later write wins. Arrays use the element index as the
//! hash, forming a dense 0..N-1 key set that supports append only.
//!
//! ## Concurrency
//!
//! The core is single-threaded and synchronous: a buffer is owned
//! exclusively by its holder for the duration of any call, and concurrent
//! calls on the same buffer are undefined. Independent documents can be
//! used in parallel without coordination. Every mutation bumps the target
//! root's 24-bit generation counter, which outstanding iterators check on
//! each step and fail fast on any change.
//!
//! ## Module Overview
//!
//! - [`document`]: the public handle and JSON bridge
//! - [`tree`]: find/insert/split over the embedded B-tree
//! - [`node`]: the 96-byte node header and its bit-packed fields
//! - [`value`]: type tags, value codec, runtime-typed values
//! - [`iter`]: in-order traversal with generation fencing
//! - [`arena`]: the bump-allocated growable buffer
//! - [`encoding`]: little-endian primitives, DJB2, key tags

pub mod arena;
pub mod document;
pub mod encoding;
pub mod error;
pub mod iter;
mod json;
pub mod node;
pub mod tree;
pub mod value;

pub use document::{Document, DEFAULT_CAPACITY, ROOT};
pub use error::{Error, Result};
pub use iter::{Entries, Entry, Keys, Values};
pub use node::NodeType;
pub use value::{Value, ValueRef, MAX_SAFE_INTEGER};
