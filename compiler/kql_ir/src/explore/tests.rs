#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use super::*;
use crate::data::{DataSlot, DataValue};
use crate::RuntimeNode;
use pretty_assertions::assert_eq;

#[test]
fn shared_nodes_are_listed_once() {
    let mut env = Env::new();
    let i64_ty = env.data_type(DataSlot::Int64).unwrap();
    let opt = env.optional_type(i64_ty).unwrap();
    let tuple = env.tuple_type(vec![opt, opt]).unwrap();

    let mut explorer = GraphExplorer::new();
    let nodes = explorer.walk(&env, tuple).to_vec();
    assert_eq!(nodes, vec![tuple, opt, i64_ty]);
    assert!(explorer.contains(opt));
}

#[test]
fn literals_list_their_type_first() {
    let mut env = Env::new();
    let ty = env.data_type(DataSlot::Bool).unwrap();
    let list_ty = env.list_type(ty).unwrap();
    let t = env.data_literal(ty, DataValue::Bool(true)).unwrap();
    let f = env.data_literal(ty, DataValue::Bool(false)).unwrap();
    let list = env
        .list_literal(list_ty, vec![RuntimeNode::immediate(t), RuntimeNode::deferred(f)])
        .unwrap();

    let mut explorer = GraphExplorer::new();
    explorer.walk(&env, list);
    assert_eq!(explorer.nodes(), &[list, list_ty, ty, t, f]);
}

#[test]
fn walk_replaces_previous_result() {
    let mut env = Env::new();
    let a = env.data_type(DataSlot::Int8).unwrap();
    let b = env.list_type(a).unwrap();

    let mut explorer = GraphExplorer::new();
    explorer.walk(&env, b);
    assert_eq!(explorer.len(), 2);
    explorer.walk(&env, NodeId::VOID);
    assert_eq!(explorer.nodes(), &[NodeId::VOID]);
    assert!(!explorer.contains(a));
}

#[test]
fn deep_chain_does_not_recurse() {
    let mut env = Env::new();
    let mut ty = NodeId::VOID_TYPE;
    for _ in 0..100_000 {
        ty = env.optional_type(ty).unwrap();
    }
    let mut explorer = GraphExplorer::new();
    assert_eq!(explorer.walk(&env, ty).len(), 100_001);
}
