//! Reachable-node enumeration.
//!
//! The explorer walks a graph from its root and records every distinct node
//! once, in pre-order with children visited in logical order. The order is
//! stable for a given graph, which makes it usable for anything that must
//! be deterministic across runs (name table construction, for one).

use rustc_hash::FxHashSet;

use crate::{Env, NodeId};

/// Stable enumeration of the nodes reachable from a root.
#[derive(Default, Debug)]
pub struct GraphExplorer {
    nodes: Vec<NodeId>,
    seen: FxHashSet<NodeId>,
}

impl GraphExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk from `root`, replacing any previous result.
    ///
    /// Uses an explicit stack; graph depth does not grow the call stack.
    pub fn walk(&mut self, env: &Env, root: NodeId) -> &[NodeId] {
        self.nodes.clear();
        self.seen.clear();

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.seen.insert(id) {
                continue;
            }
            self.nodes.push(id);
            let Some(node) = env.try_get(id) else {
                continue;
            };
            let children = node.children();
            stack.extend(children.into_iter().rev());
        }

        tracing::trace!(root = %root, reachable = self.nodes.len(), "graph explored");
        &self.nodes
    }

    /// Nodes found by the last walk.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.seen.contains(&id)
    }
}

#[cfg(test)]
mod tests;
