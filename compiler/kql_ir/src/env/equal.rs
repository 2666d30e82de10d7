//! Structural equality across environments.
//!
//! Two graphs are equal when they have the same shape, the same scalar
//! values and names, the same immediacy on every link, and the same
//! sharing: a node reached twice on one side must correspond to a single
//! node reached twice on the other.

use rustc_hash::FxHashMap;

use crate::node::{CallableBody, Node};
use crate::{Env, NodeId, RuntimeNode};

/// Compare two rooted graphs, possibly from different environments.
pub fn structurally_equal(left: &Env, l: RuntimeNode, right: &Env, r: RuntimeNode) -> bool {
    if l.immediate != r.immediate {
        return false;
    }

    let mut forward: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut backward: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut stack = vec![(l.node, r.node)];

    while let Some((a, b)) = stack.pop() {
        if a.is_singleton() || b.is_singleton() {
            if a != b {
                return false;
            }
            continue;
        }

        match (forward.get(&a), backward.get(&b)) {
            (Some(&seen_b), Some(&seen_a)) if seen_b == b && seen_a == a => continue,
            (None, None) => {
                forward.insert(a, b);
                backward.insert(b, a);
            }
            _ => return false,
        }

        let (Some(na), Some(nb)) = (left.try_get(a), right.try_get(b)) else {
            return false;
        };
        if !shallow_equal(left, na, right, nb) {
            return false;
        }

        let ca = na.children();
        let cb = nb.children();
        if ca.len() != cb.len() {
            return false;
        }
        stack.extend(ca.into_iter().zip(cb).rev());
    }
    true
}

/// Compare everything about two nodes except the identity of their children.
fn shallow_equal(le: &Env, a: &Node, re: &Env, b: &Node) -> bool {
    let flags_eq =
        |x: &[RuntimeNode], y: &[RuntimeNode]| x.iter().map(|n| n.immediate).eq(y.iter().map(|n| n.immediate));
    let opt_flag_eq =
        |x: &Option<RuntimeNode>, y: &Option<RuntimeNode>| x.map(|n| n.immediate) == y.map(|n| n.immediate);

    match (a, b) {
        (Node::DataType { slot: s1, decimal: d1 }, Node::DataType { slot: s2, decimal: d2 }) => {
            s1 == s2 && d1 == d2
        }
        (Node::PgType { type_id: t1 }, Node::PgType { type_id: t2 }) => t1 == t2,
        (Node::StructType { members: m1 }, Node::StructType { members: m2 }) => {
            m1.len() == m2.len()
                && m1
                    .iter()
                    .zip(m2)
                    .all(|(x, y)| le.name_str(x.name) == re.name_str(y.name))
        }
        (Node::ListType { .. }, Node::ListType { .. })
        | (Node::StreamType { .. }, Node::StreamType { .. })
        | (Node::FlowType { .. }, Node::FlowType { .. })
        | (Node::OptionalType { .. }, Node::OptionalType { .. })
        | (Node::VariantType { .. }, Node::VariantType { .. })
        | (Node::DictType { .. }, Node::DictType { .. })
        | (Node::TupleType { .. }, Node::TupleType { .. })
        | (Node::MultiType { .. }, Node::MultiType { .. }) => true,
        (Node::BlockType { shape: s1, .. }, Node::BlockType { shape: s2, .. }) => s1 == s2,
        (Node::TaggedType { tag: t1, .. }, Node::TaggedType { tag: t2, .. })
        | (Node::ResourceType { tag: t1 }, Node::ResourceType { tag: t2 }) => {
            le.name_str(*t1) == re.name_str(*t2)
        }
        (Node::CallableType(x), Node::CallableType(y)) => {
            le.name_str(x.name) == re.name_str(y.name)
                && x.args.len() == y.args.len()
                && x.payload.is_some() == y.payload.is_some()
                && x.optional_args == y.optional_args
                && x.merge_disabled == y.merge_disabled
        }
        (
            Node::DataLiteral { value: v1, tz: z1, .. },
            Node::DataLiteral { value: v2, tz: z2, .. },
        ) => v1.same_bits(v2) && z1 == z2,
        (Node::StructLiteral { values: x, .. }, Node::StructLiteral { values: y, .. })
        | (Node::TupleLiteral { values: x, .. }, Node::TupleLiteral { values: y, .. })
        | (Node::ListLiteral { items: x, .. }, Node::ListLiteral { items: y, .. }) => flags_eq(x, y),
        (Node::OptionalLiteral { item: x, .. }, Node::OptionalLiteral { item: y, .. })
        | (Node::AnyLiteral { item: x }, Node::AnyLiteral { item: y }) => opt_flag_eq(x, y),
        (Node::DictLiteral { items: x, .. }, Node::DictLiteral { items: y, .. }) => {
            x.len() == y.len()
                && x.iter().zip(y).all(|((k1, p1), (k2, p2))| {
                    k1.immediate == k2.immediate && p1.immediate == p2.immediate
                })
        }
        (
            Node::Callable { body: b1, unique_id: u1, .. },
            Node::Callable { body: b2, unique_id: u2, .. },
        ) => {
            u1 == u2
                && match (b1, b2) {
                    (CallableBody::Result(x), CallableBody::Result(y)) => x.immediate == y.immediate,
                    (CallableBody::Inputs(x), CallableBody::Inputs(y)) => flags_eq(x, y),
                    _ => false,
                }
        }
        (
            Node::VariantLiteral { item: x, index: i1, .. },
            Node::VariantLiteral { item: y, index: i2, .. },
        ) => x.immediate == y.immediate && i1 == i2,
        _ => false,
    }
}
