//! Node arena and factory.
//!
//! The `Env` owns every node of a graph and the interner for its names.
//! Nodes are only created through the validated constructors in
//! [`construct`](self::construct); the codec builds decoded graphs through
//! the same interface a caller uses to build input graphs.
//!
//! # Singletons
//!
//! Leaf nodes that carry no data (`Void`, `Null`, the empty containers, the
//! type of types and `Any`) are allocated once when the environment is
//! created and live at the fixed [`NodeId`] constants.
//!
//! # Identity
//!
//! There is no structural hash-consing: two constructor calls with equal
//! arguments produce two distinct nodes. Sharing in a graph is exactly the
//! sharing the builder asked for.

mod construct;
mod equal;
mod format;

pub use equal::structurally_equal;

use crate::{EnvError, Kind, Name, Node, NodeId, StringInterner};

/// Default size of the timezone table that timezone ids index into.
pub const TIMEZONE_COUNT: u32 = 600;

/// Node arena, name interner and factory.
pub struct Env {
    nodes: Vec<Node>,
    interner: StringInterner,
    timezone_count: u32,
}

impl Env {
    /// Create an environment with the default timezone table.
    pub fn new() -> Self {
        Self::with_timezone_count(TIMEZONE_COUNT)
    }

    /// Create an environment that accepts timezone ids below `count`.
    pub fn with_timezone_count(count: u32) -> Self {
        let mut nodes = Vec::with_capacity(64);
        // Order must match the NodeId singleton constants.
        nodes.extend([
            Node::TypeType,
            Node::VoidType,
            Node::NullType,
            Node::EmptyListType,
            Node::EmptyDictType,
            Node::AnyType,
            Node::Void,
            Node::Null,
            Node::EmptyList,
            Node::EmptyDict,
        ]);
        debug_assert_eq!(nodes.len(), NodeId::SINGLETON_COUNT as usize);
        Self {
            nodes,
            interner: StringInterner::new(),
            timezone_count: count.min(u32::from(u16::MAX) + 1),
        }
    }

    /// Number of timezone ids this environment accepts.
    pub fn timezone_count(&self) -> u32 {
        self.timezone_count
    }

    /// Number of allocated nodes, singletons included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if only the singletons are allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= NodeId::SINGLETON_COUNT as usize
    }

    /// Get the node behind an id.
    ///
    /// Ids are only handed out by this environment, so indexing is in range
    /// for any id it produced.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get the node behind an id, or `None` if it was not allocated here.
    #[inline]
    pub fn try_get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Kind of a node.
    #[inline]
    pub fn kind(&self, id: NodeId) -> Kind {
        self.get(id).kind()
    }

    /// Check if a node is a Type node.
    #[inline]
    pub fn is_type(&self, id: NodeId) -> bool {
        self.get(id).is_type()
    }

    /// Singleton for a kind, fetched by kind alone.
    ///
    /// `Void`, `Null`, `EmptyList` and `EmptyDict` exist in both families;
    /// `Type` and `Any` only as types. Any other combination has no
    /// singleton.
    pub fn singleton(&self, kind: Kind, is_type: bool) -> Option<NodeId> {
        Some(match (kind, is_type) {
            (Kind::Type, true) => NodeId::TYPE_TYPE,
            (Kind::Void, true) => NodeId::VOID_TYPE,
            (Kind::Null, true) => NodeId::NULL_TYPE,
            (Kind::EmptyList, true) => NodeId::EMPTY_LIST_TYPE,
            (Kind::EmptyDict, true) => NodeId::EMPTY_DICT_TYPE,
            (Kind::Any, true) => NodeId::ANY_TYPE,
            (Kind::Void, false) => NodeId::VOID,
            (Kind::Null, false) => NodeId::NULL,
            (Kind::EmptyList, false) => NodeId::EMPTY_LIST,
            (Kind::EmptyDict, false) => NodeId::EMPTY_DICT,
            _ => return None,
        })
    }

    // === Names ===

    /// Intern a name.
    pub fn intern(&mut self, s: &str) -> Result<Name, EnvError> {
        Ok(self.interner.try_intern(s)?)
    }

    /// Resolve a name to its string.
    pub fn name_str(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// The name interner.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    // === Allocation ===

    fn alloc(&mut self, node: Node) -> Result<NodeId, EnvError> {
        let raw = u32::try_from(self.nodes.len()).map_err(|_| EnvError::ArenaOverflow {
            count: self.nodes.len(),
        })?;
        self.nodes.push(node);
        Ok(NodeId::from_raw(raw))
    }

    fn check_exists(&self, id: NodeId) -> Result<(), EnvError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(EnvError::DanglingNode { node: id })
        }
    }

    fn expect_type(&self, id: NodeId) -> Result<&Node, EnvError> {
        match self.try_get(id) {
            Some(node) if node.is_type() => Ok(node),
            Some(_) => Err(EnvError::NotAType { node: id }),
            None => Err(EnvError::DanglingNode { node: id }),
        }
    }

    fn expect_type_kind(&self, id: NodeId, expected: Kind) -> Result<&Node, EnvError> {
        let node = self.expect_type(id)?;
        let found = node.kind();
        if found == expected {
            Ok(node)
        } else {
            Err(EnvError::WrongTypeKind { expected, found })
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
