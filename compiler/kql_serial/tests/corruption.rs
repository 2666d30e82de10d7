//! Damaged streams fail cleanly.

#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use kql_ir::{CallableBody, CallableSig, DataSlot, DataValue, Env, NodeId, RuntimeNode};
use kql_serial::{deserialize_node, serialize_node, Corruption, SerialError};

fn imm(id: NodeId) -> RuntimeNode {
    RuntimeNode::immediate(id)
}

/// A stream touching names, refs, two-pass literals and scalars.
fn sample_stream() -> Vec<u8> {
    let mut env = Env::new();
    let f = env.intern("f").unwrap();
    let int32 = env.data_type(DataSlot::Int32).unwrap();
    let text = env.data_type(DataSlot::Utf8).unwrap();
    let ty = env.struct_type_of(&[("id", int32), ("name", text), ("id2", int32)]).unwrap();
    let id = env.data_literal(int32, DataValue::I32(-300)).unwrap();
    let name = env.data_literal(text, DataValue::Bytes(b"row".to_vec())).unwrap();
    let row = env.struct_literal(ty, vec![imm(id), RuntimeNode::deferred(name), imm(id)]).unwrap();
    let call_ty = env.callable_type(CallableSig::new(f, ty, vec![ty, int32])).unwrap();
    let call = env
        .callable(call_ty, CallableBody::Inputs(vec![imm(row), imm(id)]), 9)
        .unwrap();
    let list_ty = env.list_type(call_ty).unwrap();
    let list = env.list_literal(list_ty, vec![imm(call), imm(call)]).unwrap();
    serialize_node(&env, list)
}

#[test]
fn sample_stream_decodes() {
    let bytes = sample_stream();
    let mut env = Env::new();
    let root = deserialize_node(&bytes, &mut env).unwrap();
    assert_eq!(
        env.format_node(root),
        "[f({id: -300, name: \"row\", id2: -300}, -300), f({id: -300, name: \"row\", id2: -300}, -300)]"
    );
}

#[test]
fn every_truncation_fails() {
    let bytes = sample_stream();
    for len in 0..bytes.len() {
        let mut env = Env::new();
        match deserialize_node(&bytes[..len], &mut env) {
            Err(SerialError::PrematureEnd { .. } | SerialError::Corrupted { .. }) => {}
            other => panic!("prefix of {len} bytes: unexpected {other:?}"),
        }
    }
}

#[test]
fn trailing_garbage_is_rejected() {
    let mut bytes = sample_stream();
    bytes.extend_from_slice(&[0x00, 0x00]);
    let mut env = Env::new();
    assert!(matches!(
        deserialize_node(&bytes, &mut env),
        Err(SerialError::Corrupted {
            kind: Corruption::TrailingBytes { count: 2 },
            ..
        })
    ));
}

#[test]
fn bit_flips_never_panic() {
    let bytes = sample_stream();
    for pos in 0..bytes.len() {
        for bit in 0..8 {
            let mut damaged = bytes.clone();
            damaged[pos] ^= 1 << bit;
            let mut env = Env::new();
            // Any outcome is fine as long as it is not a panic.
            let _ = deserialize_node(&damaged, &mut env);
        }
    }
}

#[test]
fn ref_cannot_point_forward() {
    // Tuple type whose first element refers to node 0 before anything is built.
    let bytes = [0x1f, 0x00, 0x89, 0x02, 0x3f, 0x00, 0x81, 0x2f];
    let mut env = Env::new();
    assert!(matches!(
        deserialize_node(&bytes, &mut env),
        Err(SerialError::Corrupted {
            kind: Corruption::RefOutOfRange { index: 0, len: 0 },
            ..
        })
    ));
}
