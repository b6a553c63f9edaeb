//! Fuzz testing for the document handle.
//!
//! This fuzz target applies arbitrary operation sequences to a document and
//! checks that reads, enumeration, and JSON projection never panic and that
//! every container's entry count matches its enumeration.
//!
//! Scalar keys and container keys live in disjoint namespaces (`s`/`c`
//! prefixes) so a saved container offset is never scalar-overwritten into a
//! dangling handle; replacing a container with a container re-initializes
//! the same node in place and keeps the offset valid.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use lite3::{Document, NodeType, ROOT};

#[derive(Debug, Arbitrary)]
struct DocumentInput {
    array_root: bool,
    operations: Vec<Operation>,
}

#[derive(Debug, Arbitrary)]
enum Operation {
    SetNull(u8),
    SetBool(u8, bool),
    SetI64(u8, i64),
    SetF64(u8, f64),
    SetStr(u8, String),
    SetBytes(u8, Vec<u8>),
    SetObject(u8),
    SetArray(u8),
    PushNull,
    PushBool(bool),
    PushI64(i64),
    PushStr(String),
    PushObject,
    PushArray,
    Get(u8),
    GetAt(u8),
    ReinitRoot(bool),
}

fn scalar_key(k: u8) -> String {
    format!("s{}", k)
}

fn container_key(k: u8) -> String {
    format!("c{}", k)
}

fuzz_target!(|input: DocumentInput| {
    if input.operations.len() > 64 {
        return;
    }

    let mut doc = Document::new();
    if input.array_root {
        doc.init_array().unwrap();
    } else {
        doc.init_object().unwrap();
    }

    // Offsets of every container created so far; operations target one of
    // them round-robin so nested trees get exercised too.
    let mut containers = vec![ROOT];
    let mut next = 0usize;

    for op in &input.operations {
        let target = containers[next % containers.len()];
        next += 1;
        let is_object = doc.node_type(target).unwrap() == NodeType::Object;

        match op {
            Operation::SetNull(k) if is_object => {
                doc.set_null(target, &scalar_key(*k)).unwrap();
            }
            Operation::SetBool(k, v) if is_object => {
                doc.set_bool(target, &scalar_key(*k), *v).unwrap();
            }
            Operation::SetI64(k, v) if is_object => {
                doc.set_i64(target, &scalar_key(*k), *v).unwrap();
            }
            Operation::SetF64(k, v) if is_object && !v.is_nan() => {
                doc.set_f64(target, &scalar_key(*k), *v).unwrap();
            }
            Operation::SetStr(k, v) if is_object && v.len() <= 1024 => {
                doc.set_str(target, &scalar_key(*k), v).unwrap();
            }
            Operation::SetBytes(k, v) if is_object && v.len() <= 1024 => {
                doc.set_bytes(target, &scalar_key(*k), v).unwrap();
            }
            Operation::SetObject(k) if is_object => {
                containers.push(doc.set_object(target, &container_key(*k)).unwrap());
            }
            Operation::SetArray(k) if is_object => {
                containers.push(doc.set_array(target, &container_key(*k)).unwrap());
            }
            Operation::PushNull if !is_object => {
                doc.push_null(target).unwrap();
            }
            Operation::PushBool(v) if !is_object => {
                doc.push_bool(target, *v).unwrap();
            }
            Operation::PushI64(v) if !is_object => {
                doc.push_i64(target, *v).unwrap();
            }
            Operation::PushStr(v) if !is_object && v.len() <= 1024 => {
                doc.push_str(target, v).unwrap();
            }
            Operation::PushObject if !is_object => {
                containers.push(doc.push_object(target).unwrap());
            }
            Operation::PushArray if !is_object => {
                containers.push(doc.push_array(target).unwrap());
            }
            Operation::Get(k) if is_object => {
                let _ = doc.get(target, &scalar_key(*k)).unwrap();
            }
            Operation::GetAt(i) if !is_object => {
                let _ = doc.get_at(target, *i as u32).unwrap();
            }
            Operation::ReinitRoot(as_array) => {
                // Re-initializing the root abandons every nested offset.
                if *as_array {
                    doc.init_array().unwrap();
                } else {
                    doc.init_object().unwrap();
                }
                containers.clear();
                containers.push(ROOT);
                next = 0;
            }
            _ => {}
        }
    }

    // Invariants: the size counter matches enumeration on every container
    // (live or dead-but-detached), projection never panics, and the buffer
    // re-imports to the same projection.
    for &container in &containers {
        let size = doc.size(container).unwrap();
        let count = doc.entries(container).unwrap().count() as u64;
        assert_eq!(size, count, "size counter out of sync with enumeration");
    }
    let json = doc.to_json(ROOT).unwrap();
    let imported = Document::from_bytes(doc.buffer());
    assert_eq!(imported.to_json(ROOT).unwrap(), json);
});
