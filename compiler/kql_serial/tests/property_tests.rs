//! Property-based tests over random graphs and scalars.
//!
//! Graphs are generated as a small recursive `Shape` description and then
//! built into an environment, which keeps every generated graph valid.

#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use kql_ir::{
    structurally_equal, DataSlot, DataValue, Env, NodeId, RuntimeNode, StructMember,
};
use kql_serial::{deserialize_runtime_node, serialize_runtime_node, SerialError};
use proptest::prelude::*;

// -- Graph Generation --

#[derive(Clone, Debug)]
enum Shape {
    Int(i64),
    Text(String),
    Flag(bool),
    Real(f64),
    Tuple(Vec<Shape>),
    Struct(Vec<(&'static str, Shape)>),
    Optional(Box<Shape>, bool),
    /// The same built node used `n` times.
    Repeat(Box<Shape>, usize),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Shape::Int),
        "[a-z]{0,8}".prop_map(Shape::Text),
        any::<bool>().prop_map(Shape::Flag),
        any::<f64>().prop_map(Shape::Real),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::Tuple),
            prop::collection::vec((prop::sample::select(vec!["a", "b", "c"]), inner.clone()), 0..4)
                .prop_map(Shape::Struct),
            (inner.clone(), any::<bool>()).prop_map(|(s, present)| Shape::Optional(Box::new(s), present)),
            (inner, 1usize..4).prop_map(|(s, n)| Shape::Repeat(Box::new(s), n)),
        ]
    })
}

/// Build a shape; returns the literal and its type.
fn build(env: &mut Env, shape: &Shape) -> (NodeId, NodeId) {
    match shape {
        Shape::Int(v) => scalar(env, DataSlot::Int64, DataValue::I64(*v)),
        Shape::Text(s) => scalar(env, DataSlot::Utf8, DataValue::Bytes(s.as_bytes().to_vec())),
        Shape::Flag(b) => scalar(env, DataSlot::Bool, DataValue::Bool(*b)),
        Shape::Real(v) => scalar(env, DataSlot::Double, DataValue::F64(*v)),
        Shape::Tuple(items) => {
            let built: Vec<_> = items.iter().map(|item| build(env, item)).collect();
            let ty = env.tuple_type(built.iter().map(|&(_, ty)| ty).collect()).unwrap();
            let values = built.iter().map(|&(lit, _)| RuntimeNode::immediate(lit)).collect();
            (env.tuple_literal(ty, values).unwrap(), ty)
        }
        Shape::Struct(members) => {
            let mut types = Vec::new();
            let mut values = Vec::new();
            for (i, (name, member)) in members.iter().enumerate() {
                let (lit, ty) = build(env, member);
                types.push(StructMember {
                    name: env.intern(name).unwrap(),
                    ty,
                });
                values.push(RuntimeNode::new(lit, i % 2 == 0));
            }
            let ty = env.struct_type(types).unwrap();
            (env.struct_literal(ty, values).unwrap(), ty)
        }
        Shape::Optional(inner, present) => {
            let (lit, inner_ty) = build(env, inner);
            let ty = env.optional_type(inner_ty).unwrap();
            let item = present.then(|| RuntimeNode::deferred(lit));
            (env.optional_literal(ty, item).unwrap(), ty)
        }
        Shape::Repeat(inner, n) => {
            let (lit, inner_ty) = build(env, inner);
            let ty = env.tuple_type(vec![inner_ty; *n]).unwrap();
            let values = (0..*n).map(|i| RuntimeNode::new(lit, i % 2 == 1)).collect();
            (env.tuple_literal(ty, values).unwrap(), ty)
        }
    }
}

fn scalar(env: &mut Env, slot: DataSlot, value: DataValue) -> (NodeId, NodeId) {
    let ty = env.data_type(slot).unwrap();
    (env.data_literal(ty, value).unwrap(), ty)
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn round_trip_preserves_structure(shape in shape_strategy(), immediate in any::<bool>()) {
        let mut env = Env::new();
        let (lit, _) = build(&mut env, &shape);
        let root = RuntimeNode::new(lit, immediate);
        let bytes = serialize_runtime_node(&env, root);

        let mut fresh = Env::new();
        let decoded = deserialize_runtime_node(&bytes, &mut fresh).unwrap();
        prop_assert!(structurally_equal(&env, root, &fresh, decoded));
        prop_assert_eq!(serialize_runtime_node(&fresh, decoded), bytes);
    }

    #[test]
    fn truncation_is_always_detected(shape in shape_strategy(), cut in any::<prop::sample::Index>()) {
        let mut env = Env::new();
        let (lit, _) = build(&mut env, &shape);
        let bytes = serialize_runtime_node(&env, RuntimeNode::immediate(lit));
        let len = cut.index(bytes.len());

        let mut fresh = Env::new();
        let result = deserialize_runtime_node(&bytes[..len], &mut fresh);
        prop_assert!(
            matches!(result, Err(SerialError::PrematureEnd { .. } | SerialError::Corrupted { .. })),
            "prefix of {} bytes gave {:?}",
            len,
            result
        );
    }

    #[test]
    fn scalars_round_trip(v in any::<i64>(), u in any::<u64>(), bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut env = Env::new();
        let (a, ta) = scalar(&mut env, DataSlot::Interval, DataValue::I64(v));
        let (b, tb) = scalar(&mut env, DataSlot::Timestamp, DataValue::U64(u));
        let (c, tc) = scalar(&mut env, DataSlot::String, DataValue::Bytes(bytes));
        let ty = env.tuple_type(vec![ta, tb, tc]).unwrap();
        let lit = env
            .tuple_literal(ty, [a, b, c].into_iter().map(RuntimeNode::immediate).collect())
            .unwrap();
        let root = RuntimeNode::immediate(lit);

        let encoded = serialize_runtime_node(&env, root);
        let mut fresh = Env::new();
        let decoded = deserialize_runtime_node(&encoded, &mut fresh).unwrap();
        prop_assert!(structurally_equal(&env, root, &fresh, decoded));
    }
}
