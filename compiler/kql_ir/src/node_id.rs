//! Node handle.
//!
//! Every node lives in an [`Env`](crate::Env) arena and is referenced by a
//! 32-bit `NodeId`. Singleton leaf nodes are allocated when the environment
//! is created and always sit at the fixed indices below, so they can be
//! fetched by kind alone.

use std::fmt;

/// A 32-bit index into the node arena.
///
/// Node identity is index identity: two structurally equal nodes built by
/// separate constructor calls have different ids.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    // === Singleton type nodes (0-5) ===

    /// The type of types.
    pub const TYPE_TYPE: Self = Self(0);
    /// The `Void` type.
    pub const VOID_TYPE: Self = Self(1);
    /// The `Null` type.
    pub const NULL_TYPE: Self = Self(2);
    /// The `EmptyList` type.
    pub const EMPTY_LIST_TYPE: Self = Self(3);
    /// The `EmptyDict` type.
    pub const EMPTY_DICT_TYPE: Self = Self(4);
    /// The `Any` type.
    pub const ANY_TYPE: Self = Self(5);

    // === Singleton literals (6-9) ===

    /// The `Void` value.
    pub const VOID: Self = Self(6);
    /// The `Null` value.
    pub const NULL: Self = Self(7);
    /// The empty list value.
    pub const EMPTY_LIST: Self = Self(8);
    /// The empty dict value.
    pub const EMPTY_DICT: Self = Self(9);

    /// Number of pre-allocated singletons; first dynamic index.
    pub const SINGLETON_COUNT: u32 = 10;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is one of the pre-allocated singletons.
    #[inline]
    pub const fn is_singleton(self) -> bool {
        self.0 < Self::SINGLETON_COUNT
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "NodeId::TYPE_TYPE"),
            1 => write!(f, "NodeId::VOID_TYPE"),
            2 => write!(f, "NodeId::NULL_TYPE"),
            3 => write!(f, "NodeId::EMPTY_LIST_TYPE"),
            4 => write!(f, "NodeId::EMPTY_DICT_TYPE"),
            5 => write!(f, "NodeId::ANY_TYPE"),
            6 => write!(f, "NodeId::VOID"),
            7 => write!(f, "NodeId::NULL"),
            8 => write!(f, "NodeId::EMPTY_LIST"),
            9 => write!(f, "NodeId::EMPTY_DICT"),
            n => write!(f, "NodeId({n})"),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node paired with its immediacy flag.
///
/// Immediate nodes are compile-time constants; non-immediate nodes are
/// placeholders computed at run time. The flag travels with every child
/// link, so the same node can be immediate under one parent and not under
/// another.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RuntimeNode {
    pub node: NodeId,
    pub immediate: bool,
}

impl RuntimeNode {
    #[inline]
    pub const fn new(node: NodeId, immediate: bool) -> Self {
        Self { node, immediate }
    }

    /// Immediate link.
    #[inline]
    pub const fn immediate(node: NodeId) -> Self {
        Self::new(node, true)
    }

    /// Non-immediate link.
    #[inline]
    pub const fn deferred(node: NodeId) -> Self {
        Self::new(node, false)
    }
}

impl From<NodeId> for RuntimeNode {
    fn from(node: NodeId) -> Self {
        Self::immediate(node)
    }
}
