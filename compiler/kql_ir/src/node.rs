//! Node variants.
//!
//! A [`Node`] is either a Type node (describes a shape) or a Literal node
//! (a value of some shape). Both families live in the same arena and share
//! the [`Kind`] tag space; [`Node::is_type`] tells them apart.

use smallvec::SmallVec;

use crate::data::{DataSlot, DataValue, DecimalParams};
use crate::{Kind, Name, NodeId, RuntimeNode};

/// Block shape for `Block` types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum BlockShape {
    Scalar = 0,
    Many = 1,
}

impl BlockShape {
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Scalar),
            1 => Some(Self::Many),
            _ => None,
        }
    }
}

/// Named member of a Struct type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructMember {
    pub name: Name,
    pub ty: NodeId,
}

/// Signature of a Callable type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallableSig {
    pub name: Name,
    pub ret: NodeId,
    pub args: Vec<NodeId>,
    /// Arbitrary node attached to the signature; not required to be a type.
    pub payload: Option<NodeId>,
    pub optional_args: u32,
    pub merge_disabled: bool,
}

impl CallableSig {
    /// Signature with no optional arguments, no payload and merging enabled.
    pub fn new(name: Name, ret: NodeId, args: Vec<NodeId>) -> Self {
        Self {
            name,
            ret,
            args,
            payload: None,
            optional_args: 0,
            merge_disabled: false,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: NodeId) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn with_optional_args(mut self, count: u32) -> Self {
        self.optional_args = count;
        self
    }

    #[must_use]
    pub fn merge_disabled(mut self) -> Self {
        self.merge_disabled = true;
        self
    }
}

/// Either the evaluated result of a call, or its unevaluated inputs.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallableBody {
    Result(RuntimeNode),
    Inputs(Vec<RuntimeNode>),
}

/// A node in the type/value graph.
#[derive(Clone, PartialEq, Debug)]
pub enum Node {
    // === Singleton types ===
    TypeType,
    VoidType,
    NullType,
    EmptyListType,
    EmptyDictType,
    AnyType,

    // === Composite types ===
    DataType {
        slot: DataSlot,
        decimal: Option<DecimalParams>,
    },
    PgType {
        type_id: u32,
    },
    StructType {
        members: Vec<StructMember>,
    },
    ListType {
        item: NodeId,
    },
    StreamType {
        item: NodeId,
    },
    FlowType {
        item: NodeId,
    },
    BlockType {
        item: NodeId,
        shape: BlockShape,
    },
    OptionalType {
        item: NodeId,
    },
    TaggedType {
        base: NodeId,
        tag: Name,
    },
    DictType {
        key: NodeId,
        payload: NodeId,
    },
    CallableType(Box<CallableSig>),
    TupleType {
        elements: Vec<NodeId>,
    },
    MultiType {
        elements: Vec<NodeId>,
    },
    ResourceType {
        tag: Name,
    },
    VariantType {
        underlying: NodeId,
    },

    // === Singleton literals ===
    Void,
    Null,
    EmptyList,
    EmptyDict,

    // === Composite literals ===
    DataLiteral {
        ty: NodeId,
        value: DataValue,
        tz: Option<u16>,
    },
    StructLiteral {
        ty: NodeId,
        values: Vec<RuntimeNode>,
    },
    ListLiteral {
        ty: NodeId,
        items: Vec<RuntimeNode>,
    },
    OptionalLiteral {
        ty: NodeId,
        item: Option<RuntimeNode>,
    },
    DictLiteral {
        ty: NodeId,
        items: Vec<(RuntimeNode, RuntimeNode)>,
    },
    Callable {
        ty: NodeId,
        body: CallableBody,
        unique_id: u32,
    },
    AnyLiteral {
        item: Option<RuntimeNode>,
    },
    TupleLiteral {
        ty: NodeId,
        values: Vec<RuntimeNode>,
    },
    VariantLiteral {
        ty: NodeId,
        item: RuntimeNode,
        index: u32,
    },
}

/// Child list returned by [`Node::children`].
pub type Children = SmallVec<[NodeId; 4]>;

impl Node {
    /// Structural kind of this node.
    pub fn kind(&self) -> Kind {
        match self {
            Self::TypeType => Kind::Type,
            Self::VoidType | Self::Void => Kind::Void,
            Self::NullType | Self::Null => Kind::Null,
            Self::EmptyListType | Self::EmptyList => Kind::EmptyList,
            Self::EmptyDictType | Self::EmptyDict => Kind::EmptyDict,
            Self::AnyType | Self::AnyLiteral { .. } => Kind::Any,
            Self::DataType { .. } | Self::DataLiteral { .. } => Kind::Data,
            Self::PgType { .. } => Kind::Pg,
            Self::StructType { .. } | Self::StructLiteral { .. } => Kind::Struct,
            Self::ListType { .. } | Self::ListLiteral { .. } => Kind::List,
            Self::StreamType { .. } => Kind::Stream,
            Self::FlowType { .. } => Kind::Flow,
            Self::BlockType { .. } => Kind::Block,
            Self::OptionalType { .. } | Self::OptionalLiteral { .. } => Kind::Optional,
            Self::TaggedType { .. } => Kind::Tagged,
            Self::DictType { .. } | Self::DictLiteral { .. } => Kind::Dict,
            Self::CallableType(_) | Self::Callable { .. } => Kind::Callable,
            Self::TupleType { .. } | Self::TupleLiteral { .. } => Kind::Tuple,
            Self::MultiType { .. } => Kind::Multi,
            Self::ResourceType { .. } => Kind::Resource,
            Self::VariantType { .. } | Self::VariantLiteral { .. } => Kind::Variant,
        }
    }

    /// Whether this is a Type node.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Self::TypeType
                | Self::VoidType
                | Self::NullType
                | Self::EmptyListType
                | Self::EmptyDictType
                | Self::AnyType
                | Self::DataType { .. }
                | Self::PgType { .. }
                | Self::StructType { .. }
                | Self::ListType { .. }
                | Self::StreamType { .. }
                | Self::FlowType { .. }
                | Self::BlockType { .. }
                | Self::OptionalType { .. }
                | Self::TaggedType { .. }
                | Self::DictType { .. }
                | Self::CallableType(_)
                | Self::TupleType { .. }
                | Self::MultiType { .. }
                | Self::ResourceType { .. }
                | Self::VariantType { .. }
        )
    }

    /// Whether this node is one of the pre-allocated singletons.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            Self::TypeType
                | Self::VoidType
                | Self::NullType
                | Self::EmptyListType
                | Self::EmptyDictType
                | Self::AnyType
                | Self::Void
                | Self::Null
                | Self::EmptyList
                | Self::EmptyDict
        )
    }

    /// Type of a node: `TYPE_TYPE` for every Type node, the literal's
    /// declared type otherwise.
    pub fn type_of(&self) -> NodeId {
        match self {
            Self::Void => NodeId::VOID_TYPE,
            Self::Null => NodeId::NULL_TYPE,
            Self::EmptyList => NodeId::EMPTY_LIST_TYPE,
            Self::EmptyDict => NodeId::EMPTY_DICT_TYPE,
            Self::AnyLiteral { .. } => NodeId::ANY_TYPE,
            Self::DataLiteral { ty, .. }
            | Self::StructLiteral { ty, .. }
            | Self::ListLiteral { ty, .. }
            | Self::OptionalLiteral { ty, .. }
            | Self::DictLiteral { ty, .. }
            | Self::Callable { ty, .. }
            | Self::TupleLiteral { ty, .. }
            | Self::VariantLiteral { ty, .. } => *ty,
            _ => NodeId::TYPE_TYPE,
        }
    }

    /// Every node this one references, in logical order.
    ///
    /// For literals the declared type comes first. Singletons and Any
    /// literals have no type child.
    pub fn children(&self) -> Children {
        let mut out = Children::new();
        match self {
            Self::TypeType
            | Self::VoidType
            | Self::NullType
            | Self::EmptyListType
            | Self::EmptyDictType
            | Self::AnyType
            | Self::DataType { .. }
            | Self::PgType { .. }
            | Self::ResourceType { .. }
            | Self::Void
            | Self::Null
            | Self::EmptyList
            | Self::EmptyDict => {}
            Self::StructType { members } => out.extend(members.iter().map(|m| m.ty)),
            Self::ListType { item }
            | Self::StreamType { item }
            | Self::FlowType { item }
            | Self::BlockType { item, .. }
            | Self::OptionalType { item } => out.push(*item),
            Self::TaggedType { base, .. } => out.push(*base),
            Self::VariantType { underlying } => out.push(*underlying),
            Self::DictType { key, payload } => {
                out.push(*key);
                out.push(*payload);
            }
            Self::CallableType(sig) => {
                out.push(sig.ret);
                out.extend(sig.args.iter().copied());
                out.extend(sig.payload);
            }
            Self::TupleType { elements } | Self::MultiType { elements } => {
                out.extend(elements.iter().copied());
            }
            Self::DataLiteral { ty, .. } => out.push(*ty),
            Self::StructLiteral { ty, values } | Self::TupleLiteral { ty, values } => {
                out.push(*ty);
                out.extend(values.iter().map(|v| v.node));
            }
            Self::ListLiteral { ty, items } => {
                out.push(*ty);
                out.extend(items.iter().map(|v| v.node));
            }
            Self::OptionalLiteral { ty, item } => {
                out.push(*ty);
                out.extend(item.map(|v| v.node));
            }
            Self::DictLiteral { ty, items } => {
                out.push(*ty);
                for (key, payload) in items {
                    out.push(key.node);
                    out.push(payload.node);
                }
            }
            Self::Callable { ty, body, .. } => {
                out.push(*ty);
                match body {
                    CallableBody::Result(result) => out.push(result.node),
                    CallableBody::Inputs(inputs) => out.extend(inputs.iter().map(|v| v.node)),
                }
            }
            Self::AnyLiteral { item } => out.extend(item.map(|v| v.node)),
            Self::VariantLiteral { ty, item, .. } => {
                out.push(*ty);
                out.push(item.node);
            }
        }
        out
    }

    /// Names this node carries, in the order they appear on the wire.
    pub fn names(&self) -> SmallVec<[Name; 4]> {
        let mut out = SmallVec::new();
        match self {
            Self::StructType { members } => out.extend(members.iter().map(|m| m.name)),
            Self::CallableType(sig) => out.push(sig.name),
            Self::ResourceType { tag } | Self::TaggedType { tag, .. } => out.push(*tag),
            _ => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_literals_point_at_singleton_types() {
        assert_eq!(Node::Void.type_of(), NodeId::VOID_TYPE);
        assert_eq!(Node::EmptyDict.type_of(), NodeId::EMPTY_DICT_TYPE);
        assert_eq!(Node::AnyLiteral { item: None }.type_of(), NodeId::ANY_TYPE);
        assert_eq!(Node::ListType { item: NodeId::VOID_TYPE }.type_of(), NodeId::TYPE_TYPE);
    }

    #[test]
    fn kinds_are_shared_across_families() {
        let ty = Node::TupleType { elements: vec![] };
        let lit = Node::TupleLiteral {
            ty: NodeId::from_raw(10),
            values: vec![],
        };
        assert_eq!(ty.kind(), lit.kind());
        assert!(ty.is_type());
        assert!(!lit.is_type());
    }

    #[test]
    fn dict_children_interleave_keys_and_payloads() {
        let k = |n| RuntimeNode::immediate(NodeId::from_raw(n));
        let node = Node::DictLiteral {
            ty: NodeId::from_raw(10),
            items: vec![(k(11), k(12)), (k(13), k(14))],
        };
        let raw: Vec<u32> = node.children().iter().map(|id| id.raw()).collect();
        assert_eq!(raw, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn block_shape_raw() {
        assert_eq!(BlockShape::from_raw(1), Some(BlockShape::Many));
        assert_eq!(BlockShape::from_raw(2), None);
    }
}
