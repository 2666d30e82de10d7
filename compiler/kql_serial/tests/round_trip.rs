//! End-to-end round trips through the public entry points.
//!
//! Every test builds a graph, writes it, reads it into a fresh environment
//! and checks that the result is structurally equal to the input and
//! writes back to the same bytes.

#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use kql_ir::{
    structurally_equal, BlockShape, CallableBody, CallableSig, DataSlot, DataValue, Env, Node,
    NodeId, RuntimeNode,
};
use kql_serial::{
    deserialize_node, deserialize_runtime_node, serialize_node, serialize_runtime_node,
    serialize_runtime_node_with, WriterOptions,
};
use pretty_assertions::assert_eq;

fn imm(id: NodeId) -> RuntimeNode {
    RuntimeNode::immediate(id)
}

/// Round trip `root` and return the decoded environment and root.
fn round_trip(env: &Env, root: RuntimeNode) -> (Env, RuntimeNode) {
    let bytes = serialize_runtime_node(env, root);
    let mut fresh = Env::new();
    let decoded = deserialize_runtime_node(&bytes, &mut fresh).unwrap();
    assert!(
        structurally_equal(env, root, &fresh, decoded),
        "decoded graph differs:\n  in:  {}\n  out: {}",
        env.format_node(root.node),
        fresh.format_node(decoded.node),
    );
    assert_eq!(serialize_runtime_node(&fresh, decoded), bytes, "rewrite differs");
    (fresh, decoded)
}

#[test]
fn two_member_struct_literal() {
    let mut env = Env::new();
    let int32 = env.data_type(DataSlot::Int32).unwrap();
    let ty = env.struct_type_of(&[("a", int32), ("b", int32)]).unwrap();
    let five = env.data_literal(int32, DataValue::I32(5)).unwrap();
    let minus_five = env.data_literal(int32, DataValue::I32(-5)).unwrap();
    let lit = env.struct_literal(ty, vec![imm(five), imm(minus_five)]).unwrap();

    let bytes = serialize_node(&env, lit);
    // Int32 is written once; everything else points back at it.
    assert_eq!(bytes.iter().filter(|&&b| b == 0x82).count(), 1);

    let (fresh, root) = round_trip(&env, imm(lit));
    assert_eq!(fresh.format_node(root.node), "{a: 5, b: -5}");
}

#[test]
fn tuple_of_shared_optional_type() {
    let mut env = Env::new();
    let int64 = env.data_type(DataSlot::Int64).unwrap();
    let opt = env.optional_type(int64).unwrap();
    let ty = env.tuple_type(vec![opt, opt]).unwrap();
    let one = env.data_literal(int64, DataValue::I64(1)).unwrap();
    let some = env.optional_literal(opt, Some(imm(one))).unwrap();
    let none = env.optional_literal(opt, None).unwrap();
    let lit = env.tuple_literal(ty, vec![imm(some), imm(none)]).unwrap();

    let bytes = serialize_node(&env, ty);
    assert_eq!(bytes, vec![0x1f, 0x00, 0x89, 0x02, 0x85, 0x82, 0x03, 0x3f, 0x01, 0x2f]);

    let (fresh, root) = round_trip(&env, imm(lit));
    let Node::TupleLiteral { ty, .. } = fresh.get(root.node) else {
        panic!("not a tuple literal");
    };
    let Node::TupleType { elements } = fresh.get(*ty) else {
        panic!("not a tuple type");
    };
    assert_eq!(elements[0], elements[1]);
}

#[test]
fn repeated_item_is_one_encoding_plus_refs() {
    let mut env = Env::new();
    let int32 = env.data_type(DataSlot::Int32).unwrap();
    let list = env.list_type(int32).unwrap();
    let seven = env.data_literal(int32, DataValue::I32(7)).unwrap();
    let lit = env.list_literal(list, vec![imm(seven); 4]).unwrap();

    #[rustfmt::skip]
    let expected = vec![
        0x1f, 0x00,
        0x04, 0x04,
        0x84, 0x82, 0x01,
        0x02, 0x3f, 0x00, 0x0e,
        0x3f, 0x02, 0x3f, 0x02, 0x3f, 0x02,
        0x0f,
        0x2f,
    ];
    assert_eq!(serialize_node(&env, lit), expected);

    let (fresh, root) = round_trip(&env, imm(lit));
    let Node::ListLiteral { items, .. } = fresh.get(root.node) else {
        panic!("not a list literal");
    };
    assert!(items.iter().all(|item| item.node == items[0].node));
}

#[test]
fn name_table_holds_only_repeated_names() {
    let mut env = Env::new();
    let twice = env.struct_type_of(&[("x", NodeId::VOID_TYPE), ("x", NodeId::NULL_TYPE)]).unwrap();
    let bytes = serialize_node(&env, twice);
    assert_eq!(&bytes[..4], &[0x1f, 0x01, 0x01, b'x']);
    round_trip(&env, imm(twice));

    let distinct = env.struct_type_of(&[("x", NodeId::VOID_TYPE), ("y", NodeId::NULL_TYPE)]).unwrap();
    assert_eq!(serialize_node(&env, distinct)[1], 0x00);
}

#[test]
fn inline_names_decode_to_the_same_graph() {
    let mut env = Env::new();
    let inner = env.struct_type_of(&[("key", NodeId::VOID_TYPE), ("value", NodeId::NULL_TYPE)]).unwrap();
    let outer = env.struct_type_of(&[("key", inner), ("value", inner)]).unwrap();

    let options = WriterOptions::default().with_intern_names(false).with_initial_capacity(8);
    let inline = serialize_runtime_node_with(&env, imm(outer), &options);
    let interned = serialize_node(&env, outer);
    assert_eq!(inline[1], 0x00);
    assert!(interned.len() < inline.len());

    let mut a = Env::new();
    let mut b = Env::new();
    let ra = deserialize_node(&inline, &mut a).unwrap();
    let rb = deserialize_node(&interned, &mut b).unwrap();
    assert!(structurally_equal(&a, imm(ra), &b, imm(rb)));
}

#[test]
fn every_type_kind() {
    let mut env = Env::new();
    let res_tag = env.intern("Resource").unwrap();
    let json = env.intern("json").unwrap();
    let fname = env.intern("Udf").unwrap();

    let string = env.data_type(DataSlot::String).unwrap();
    let decimal = env.decimal_type(35, 10).unwrap();
    let pg = env.pg_type(1184).unwrap();
    let resource = env.resource_type(res_tag).unwrap();
    let tagged = env.tagged_type(string, json).unwrap();
    let block = env.block_type(tagged, BlockShape::Scalar).unwrap();
    let flow = env.flow_type(block).unwrap();
    let stream = env.stream_type(decimal).unwrap();
    let multi = env.multi_type(vec![pg, resource]).unwrap();
    let members = env.struct_type_of(&[("s", stream), ("m", multi)]).unwrap();
    let variant = env.variant_type(members).unwrap();
    let dict = env.dict_type(string, variant).unwrap();
    let payload = env.data_literal(string, DataValue::Bytes(b"cfg".to_vec())).unwrap();
    let sig = CallableSig::new(fname, dict, vec![flow, NodeId::ANY_TYPE, NodeId::EMPTY_LIST_TYPE])
        .with_payload(payload)
        .with_optional_args(2)
        .merge_disabled();
    let callable = env.callable_type(sig).unwrap();
    let all = env
        .tuple_type(vec![
            callable,
            NodeId::TYPE_TYPE,
            NodeId::VOID_TYPE,
            NodeId::NULL_TYPE,
            NodeId::EMPTY_DICT_TYPE,
        ])
        .unwrap();

    let (fresh, root) = round_trip(&env, imm(all));
    assert_eq!(fresh.format_node(root.node), env.format_node(all));
}

#[test]
fn every_literal_kind() {
    let mut env = Env::new();
    let add = env.intern("Add").unwrap();
    let int32 = env.data_type(DataSlot::Int32).unwrap();
    let one = env.data_literal(int32, DataValue::I32(1)).unwrap();

    let list_ty = env.list_type(int32).unwrap();
    let list = env.list_literal(list_ty, vec![imm(one), RuntimeNode::deferred(one)]).unwrap();
    let dict_ty = env.dict_type(int32, list_ty).unwrap();
    let dict = env
        .dict_literal(dict_ty, vec![(imm(one), RuntimeNode::deferred(list))])
        .unwrap();
    let opt_ty = env.optional_type(int32).unwrap();
    let some = env.optional_literal(opt_ty, Some(RuntimeNode::deferred(one))).unwrap();

    let call_ty = env
        .callable_type(CallableSig::new(add, int32, vec![int32, int32]))
        .unwrap();
    let call = env
        .callable(call_ty, CallableBody::Inputs(vec![imm(one), RuntimeNode::deferred(one)]), 0)
        .unwrap();
    let evaluated = env.callable(call_ty, CallableBody::Result(imm(one)), 17).unwrap();

    let any = env.any_literal(Some(RuntimeNode::deferred(call))).unwrap();
    let empty_any = env.any_literal(None).unwrap();

    let alts = env.tuple_type(vec![int32, list_ty]).unwrap();
    let variant_ty = env.variant_type(alts).unwrap();
    let variant = env.variant_literal(variant_ty, RuntimeNode::deferred(list), 1).unwrap();

    let parts = vec![
        dict,
        some,
        evaluated,
        any,
        empty_any,
        variant,
        NodeId::VOID,
        NodeId::NULL,
        NodeId::EMPTY_LIST,
        NodeId::EMPTY_DICT,
    ];
    let types: Vec<NodeId> = parts.iter().map(|&p| env.get(p).type_of()).collect();
    let tuple_ty = env.tuple_type(types).unwrap();
    let values = parts
        .iter()
        .enumerate()
        .map(|(i, &p)| RuntimeNode::new(p, i % 3 != 0))
        .collect();
    let tuple = env.tuple_literal(tuple_ty, values).unwrap();

    round_trip(&env, imm(tuple));
    round_trip(&env, RuntimeNode::deferred(tuple));
}

#[test]
fn scalar_boundaries() {
    let mut env = Env::new();
    let mut parts = Vec::new();
    let mut push = |env: &mut Env, slot: DataSlot, value: DataValue| {
        let ty = env.data_type(slot).unwrap();
        parts.push(env.data_literal(ty, value).unwrap());
    };
    push(&mut env, DataSlot::Int64, DataValue::I64(i64::MIN));
    push(&mut env, DataSlot::Int64, DataValue::I64(i64::MAX));
    push(&mut env, DataSlot::Uint64, DataValue::U64(u64::MAX));
    push(&mut env, DataSlot::Int32, DataValue::I32(i32::MIN));
    push(&mut env, DataSlot::Uint32, DataValue::U32(u32::MAX));
    push(&mut env, DataSlot::Int16, DataValue::I16(i16::MIN));
    push(&mut env, DataSlot::Uint16, DataValue::U16(u16::MAX));
    push(&mut env, DataSlot::Int8, DataValue::I8(i8::MIN));
    push(&mut env, DataSlot::Uint8, DataValue::U8(u8::MAX));
    push(&mut env, DataSlot::Bool, DataValue::Bool(false));
    push(&mut env, DataSlot::Double, DataValue::F64(f64::NAN));
    push(&mut env, DataSlot::Double, DataValue::F64(-0.0));
    push(&mut env, DataSlot::Float, DataValue::F32(f32::INFINITY));
    push(&mut env, DataSlot::String, DataValue::Bytes(Vec::new()));
    push(&mut env, DataSlot::String, DataValue::Bytes(vec![0xff, 0x00, 0xfe]));
    push(&mut env, DataSlot::Utf8, DataValue::Bytes("Zürich".as_bytes().to_vec()));
    push(&mut env, DataSlot::Uuid, DataValue::Uuid([0xab; 16]));
    push(&mut env, DataSlot::Date, DataValue::U16(0));

    let decimal = env.decimal_type(35, 0).unwrap();
    let max = (1i128 << 119) - 1;
    for value in [max, -max - 1, -1, 0] {
        parts.push(env.data_literal(decimal, DataValue::Decimal(value)).unwrap());
    }

    let tz_ty = env.data_type(DataSlot::TzTimestamp).unwrap();
    parts.push(env.tz_data_literal(tz_ty, DataValue::U64(1_700_000_000), 599).unwrap());

    let types: Vec<NodeId> = parts.iter().map(|&p| env.get(p).type_of()).collect();
    let ty = env.tuple_type(types).unwrap();
    let lit = env.tuple_literal(ty, parts.iter().copied().map(imm).collect()).unwrap();
    round_trip(&env, imm(lit));
}

#[test]
fn deep_type_chain() {
    let mut env = Env::new();
    let mut ty = NodeId::VOID_TYPE;
    for _ in 0..100_000 {
        ty = env.optional_type(ty).unwrap();
    }
    let bytes = serialize_node(&env, ty);
    let mut fresh = Env::new();
    let root = deserialize_node(&bytes, &mut fresh).unwrap();
    assert!(structurally_equal(&env, imm(ty), &fresh, imm(root)));
}

#[test]
fn deep_literal_chain() {
    let mut env = Env::new();
    let list_ty = env.list_type(NodeId::VOID_TYPE).unwrap();
    let mut lit = env.list_literal(list_ty, Vec::new()).unwrap();
    for _ in 0..50_000 {
        lit = env.any_literal(Some(imm(lit))).unwrap();
    }
    let bytes = serialize_node(&env, lit);
    let mut fresh = Env::new();
    let root = deserialize_node(&bytes, &mut fresh).unwrap();
    assert!(structurally_equal(&env, imm(lit), &fresh, imm(root)));
}

#[test]
fn decoding_into_a_populated_env() {
    let mut env = Env::new();
    let int32 = env.data_type(DataSlot::Int32).unwrap();
    let ty = env.struct_type_of(&[("a", int32)]).unwrap();
    let bytes = serialize_node(&env, ty);

    let mut target = Env::new();
    target.data_type(DataSlot::Bool).unwrap();
    target.intern("a").unwrap();
    let root = deserialize_node(&bytes, &mut target).unwrap();
    assert!(structurally_equal(&env, imm(ty), &target, imm(root)));
    assert_eq!(target.format_node(root), "Struct<a: Int32>");
}

#[test]
fn tracing_init_is_idempotent() {
    kql_serial::init_tracing();
    kql_serial::init_tracing();
    let env = Env::new();
    round_trip(&env, imm(NodeId::EMPTY_LIST));
}
