//! Validated node constructors.
//!
//! Every constructor checks the invariants the codec relies on: children
//! exist, type slots hold Type nodes of the right kind, and literal arity
//! matches the declared type.

use crate::data::{decimal_in_range, DataSlot, DataValue, DecimalParams};
use crate::node::{BlockShape, CallableBody, CallableSig, StructMember};
use crate::{Env, EnvError, Kind, Name, Node, NodeId, RuntimeNode};

impl Env {
    // === Scalar Types ===

    /// Create a Data type for a non-decimal scheme type.
    pub fn data_type(&mut self, slot: DataSlot) -> Result<NodeId, EnvError> {
        if slot == DataSlot::Decimal {
            return Err(EnvError::MissingDecimalParams { slot });
        }
        self.alloc(Node::DataType {
            slot,
            decimal: None,
        })
    }

    /// Create a `Decimal(precision, scale)` type.
    pub fn decimal_type(&mut self, precision: u8, scale: u8) -> Result<NodeId, EnvError> {
        let params = DecimalParams::new(precision, scale);
        if !params.is_valid() {
            return Err(EnvError::InvalidDecimalParams { precision, scale });
        }
        self.alloc(Node::DataType {
            slot: DataSlot::Decimal,
            decimal: Some(params),
        })
    }

    /// Create a Data type from a raw scheme id.
    ///
    /// Decimal ids need parameters; every other id must come without them.
    pub fn data_type_by_id(
        &mut self,
        id: u32,
        decimal: Option<DecimalParams>,
    ) -> Result<NodeId, EnvError> {
        let slot = DataSlot::from_id(id).ok_or(EnvError::UnknownDataType { id })?;
        match (slot, decimal) {
            (DataSlot::Decimal, Some(params)) => self.decimal_type(params.precision, params.scale),
            (DataSlot::Decimal, None) => Err(EnvError::MissingDecimalParams { slot }),
            (_, Some(_)) => Err(EnvError::UnexpectedDecimalParams { slot }),
            (_, None) => self.data_type(slot),
        }
    }

    /// Create a Postgres type by type id.
    pub fn pg_type(&mut self, type_id: u32) -> Result<NodeId, EnvError> {
        self.alloc(Node::PgType { type_id })
    }

    /// Create a resource type identified by `tag`.
    pub fn resource_type(&mut self, tag: Name) -> Result<NodeId, EnvError> {
        self.alloc(Node::ResourceType { tag })
    }

    // === Single-Child Types ===

    /// Create `List<item>`.
    pub fn list_type(&mut self, item: NodeId) -> Result<NodeId, EnvError> {
        self.expect_type(item)?;
        self.alloc(Node::ListType { item })
    }

    /// Create `Stream<item>`.
    pub fn stream_type(&mut self, item: NodeId) -> Result<NodeId, EnvError> {
        self.expect_type(item)?;
        self.alloc(Node::StreamType { item })
    }

    /// Create `Flow<item>`.
    pub fn flow_type(&mut self, item: NodeId) -> Result<NodeId, EnvError> {
        self.expect_type(item)?;
        self.alloc(Node::FlowType { item })
    }

    /// Create `Block<item>` with the given shape.
    pub fn block_type(&mut self, item: NodeId, shape: BlockShape) -> Result<NodeId, EnvError> {
        self.expect_type(item)?;
        self.alloc(Node::BlockType { item, shape })
    }

    /// Create `Optional<item>`.
    pub fn optional_type(&mut self, item: NodeId) -> Result<NodeId, EnvError> {
        self.expect_type(item)?;
        self.alloc(Node::OptionalType { item })
    }

    /// Create `Tagged<base, tag>`.
    pub fn tagged_type(&mut self, base: NodeId, tag: Name) -> Result<NodeId, EnvError> {
        self.expect_type(base)?;
        self.alloc(Node::TaggedType { base, tag })
    }

    /// Create `Variant<underlying>`; the underlying type is a Tuple or a Struct.
    pub fn variant_type(&mut self, underlying: NodeId) -> Result<NodeId, EnvError> {
        let found = self.expect_type(underlying)?.kind();
        if !matches!(found, Kind::Tuple | Kind::Struct) {
            return Err(EnvError::InvalidVariantUnderlying { found });
        }
        self.alloc(Node::VariantType { underlying })
    }

    // === Multi-Child Types ===

    /// Create `Dict<key, payload>`.
    pub fn dict_type(&mut self, key: NodeId, payload: NodeId) -> Result<NodeId, EnvError> {
        self.expect_type(key)?;
        self.expect_type(payload)?;
        self.alloc(Node::DictType { key, payload })
    }

    /// Create a Struct type. Member order is kept as given.
    pub fn struct_type(&mut self, members: Vec<StructMember>) -> Result<NodeId, EnvError> {
        for member in &members {
            self.expect_type(member.ty)?;
        }
        self.alloc(Node::StructType { members })
    }

    /// Create a Struct type, interning member names.
    pub fn struct_type_of(&mut self, members: &[(&str, NodeId)]) -> Result<NodeId, EnvError> {
        let mut interned = Vec::with_capacity(members.len());
        for &(name, ty) in members {
            interned.push(StructMember {
                name: self.intern(name)?,
                ty,
            });
        }
        self.struct_type(interned)
    }

    /// Create a Tuple type.
    pub fn tuple_type(&mut self, elements: Vec<NodeId>) -> Result<NodeId, EnvError> {
        for &element in &elements {
            self.expect_type(element)?;
        }
        self.alloc(Node::TupleType { elements })
    }

    /// Create a Multi type.
    pub fn multi_type(&mut self, elements: Vec<NodeId>) -> Result<NodeId, EnvError> {
        for &element in &elements {
            self.expect_type(element)?;
        }
        self.alloc(Node::MultiType { elements })
    }

    /// Create a Callable type.
    ///
    /// The payload may be any node; the return and argument slots must be
    /// types.
    pub fn callable_type(&mut self, sig: CallableSig) -> Result<NodeId, EnvError> {
        self.expect_type(sig.ret)?;
        for &arg in &sig.args {
            self.expect_type(arg)?;
        }
        if let Some(payload) = sig.payload {
            self.check_exists(payload)?;
        }
        self.alloc(Node::CallableType(Box::new(sig)))
    }

    // === Literals ===

    /// Create a Data literal for a type without timezone.
    pub fn data_literal(&mut self, ty: NodeId, value: DataValue) -> Result<NodeId, EnvError> {
        self.build_data_literal(ty, value, None)
    }

    /// Create a Data literal for a timezone-aware type.
    pub fn tz_data_literal(
        &mut self,
        ty: NodeId,
        value: DataValue,
        tz: u32,
    ) -> Result<NodeId, EnvError> {
        self.build_data_literal(ty, value, Some(tz))
    }

    fn build_data_literal(
        &mut self,
        ty: NodeId,
        value: DataValue,
        tz: Option<u32>,
    ) -> Result<NodeId, EnvError> {
        let Node::DataType { slot, .. } = *self.expect_type_kind(ty, Kind::Data)? else {
            return Err(EnvError::WrongTypeKind {
                expected: Kind::Data,
                found: self.kind(ty),
            });
        };

        let expected = slot.layout();
        let found = value.layout();
        if expected != found {
            return Err(EnvError::LayoutMismatch {
                slot,
                expected,
                found,
            });
        }

        let tz = match (slot.has_timezone(), tz) {
            (true, Some(id)) if id < self.timezone_count() => u16::try_from(id).ok(),
            (true, Some(id)) => {
                return Err(EnvError::InvalidTimezone {
                    id,
                    count: self.timezone_count(),
                })
            }
            (true, None) => return Err(EnvError::MissingTimezone { slot }),
            (false, Some(_)) => return Err(EnvError::UnexpectedTimezone { slot }),
            (false, None) => None,
        };

        match &value {
            DataValue::Decimal(v) if !decimal_in_range(*v) => {
                return Err(EnvError::DecimalOutOfRange { value: *v });
            }
            DataValue::Bytes(bytes) if slot.is_text() && std::str::from_utf8(bytes).is_err() => {
                return Err(EnvError::InvalidUtf8 { slot });
            }
            _ => {}
        }

        self.alloc(Node::DataLiteral { ty, value, tz })
    }

    /// Create a Struct literal; one value per member, in member order.
    pub fn struct_literal(
        &mut self,
        ty: NodeId,
        values: Vec<RuntimeNode>,
    ) -> Result<NodeId, EnvError> {
        let Node::StructType { members } = self.expect_type_kind(ty, Kind::Struct)? else {
            return Err(self.wrong_kind(ty, Kind::Struct));
        };
        check_arity(Kind::Struct, members.len(), values.len())?;
        self.check_links(&values)?;
        self.alloc(Node::StructLiteral { ty, values })
    }

    /// Create a Tuple literal; one value per element.
    pub fn tuple_literal(
        &mut self,
        ty: NodeId,
        values: Vec<RuntimeNode>,
    ) -> Result<NodeId, EnvError> {
        let Node::TupleType { elements } = self.expect_type_kind(ty, Kind::Tuple)? else {
            return Err(self.wrong_kind(ty, Kind::Tuple));
        };
        check_arity(Kind::Tuple, elements.len(), values.len())?;
        self.check_links(&values)?;
        self.alloc(Node::TupleLiteral { ty, values })
    }

    /// Create a List literal.
    pub fn list_literal(&mut self, ty: NodeId, items: Vec<RuntimeNode>) -> Result<NodeId, EnvError> {
        self.expect_type_kind(ty, Kind::List)?;
        self.check_links(&items)?;
        self.alloc(Node::ListLiteral { ty, items })
    }

    /// Create an Optional literal, empty when `item` is `None`.
    pub fn optional_literal(
        &mut self,
        ty: NodeId,
        item: Option<RuntimeNode>,
    ) -> Result<NodeId, EnvError> {
        self.expect_type_kind(ty, Kind::Optional)?;
        if let Some(item) = item {
            self.check_exists(item.node)?;
        }
        self.alloc(Node::OptionalLiteral { ty, item })
    }

    /// Create a Dict literal from key/payload pairs.
    pub fn dict_literal(
        &mut self,
        ty: NodeId,
        items: Vec<(RuntimeNode, RuntimeNode)>,
    ) -> Result<NodeId, EnvError> {
        self.expect_type_kind(ty, Kind::Dict)?;
        for (key, payload) in &items {
            self.check_exists(key.node)?;
            self.check_exists(payload.node)?;
        }
        self.alloc(Node::DictLiteral { ty, items })
    }

    /// Create a Callable literal.
    ///
    /// Unevaluated inputs must match the callable type's argument count.
    /// A `unique_id` of 0 means "none".
    pub fn callable(
        &mut self,
        ty: NodeId,
        body: CallableBody,
        unique_id: u32,
    ) -> Result<NodeId, EnvError> {
        let Node::CallableType(sig) = self.expect_type_kind(ty, Kind::Callable)? else {
            return Err(self.wrong_kind(ty, Kind::Callable));
        };
        let arg_count = sig.args.len();
        match &body {
            CallableBody::Result(result) => self.check_exists(result.node)?,
            CallableBody::Inputs(inputs) => {
                check_arity(Kind::Callable, arg_count, inputs.len())?;
                self.check_links(inputs)?;
            }
        }
        self.alloc(Node::Callable {
            ty,
            body,
            unique_id,
        })
    }

    /// Create an Any literal, empty when `item` is `None`.
    pub fn any_literal(&mut self, item: Option<RuntimeNode>) -> Result<NodeId, EnvError> {
        if let Some(item) = item {
            self.check_exists(item.node)?;
        }
        self.alloc(Node::AnyLiteral { item })
    }

    /// Create a Variant literal holding alternative `index`.
    pub fn variant_literal(
        &mut self,
        ty: NodeId,
        item: RuntimeNode,
        index: u32,
    ) -> Result<NodeId, EnvError> {
        let Node::VariantType { underlying } = *self.expect_type_kind(ty, Kind::Variant)? else {
            return Err(self.wrong_kind(ty, Kind::Variant));
        };
        let count = match self.get(underlying) {
            Node::TupleType { elements } => elements.len(),
            Node::StructType { members } => members.len(),
            other => {
                return Err(EnvError::InvalidVariantUnderlying {
                    found: other.kind(),
                })
            }
        };
        if index as usize >= count {
            return Err(EnvError::VariantIndexOutOfRange { index, count });
        }
        self.check_exists(item.node)?;
        self.alloc(Node::VariantLiteral { ty, item, index })
    }

    // === Helpers ===

    fn check_links(&self, links: &[RuntimeNode]) -> Result<(), EnvError> {
        for link in links {
            self.check_exists(link.node)?;
        }
        Ok(())
    }

    fn wrong_kind(&self, ty: NodeId, expected: Kind) -> EnvError {
        EnvError::WrongTypeKind {
            expected,
            found: self.kind(ty),
        }
    }
}

fn check_arity(kind: Kind, expected: usize, found: usize) -> Result<(), EnvError> {
    if expected == found {
        Ok(())
    } else {
        Err(EnvError::ArityMismatch {
            kind,
            expected,
            found,
        })
    }
}
