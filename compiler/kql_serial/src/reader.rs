//! Bytes to graph.
//!
//! The stream is written in post-order: a node's header and inline fields
//! come first, then its children, then its trailing fields. A reader cannot
//! know where those trailing fields start until every child has been read,
//! and for Struct, Tuple and unevaluated Callable literals it cannot even
//! know how many children there are until the first child (the type) has
//! been built.
//!
//! Each pending node therefore gets a [`Frame`] that may be visited several
//! times. Every visit rewinds the cursor to the node's start and re-reads
//! its header:
//!
//! 1. pass 0 reads the header and inline fields and reports how many
//!    children follow and whether another pass is needed once they exist;
//! 2. pass 1 (two-pass kinds only) inspects the freshly built type to learn
//!    the remaining child count;
//! 3. the final visit pops the built children, reads the trailing fields,
//!    and builds the node in the environment.
//!
//! Built nodes sit on a stack paired with the offset just past their
//! encoding, so popping a child also moves the cursor to where the parent's
//! next bytes begin.

use kql_ir::{
    BlockShape, CallableBody, CallableSig, DataSlot, DecimalParams, Env, Kind, Name, Node, NodeId,
    RuntimeNode, StructMember,
};

use crate::cursor::Cursor;
use crate::error::{Corruption, SerialError, SerialResult};
use crate::header::{
    bitmap_len, extended_kind, get_bit, has, nibble_kind, Header, Markers, SystemCommand, USER_MASK,
};
use crate::names::NameDescriptor;
use crate::scalar::read_scalar;

/// Which visit a frame is waiting for.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum NextPass {
    Pass(u32),
    Done,
}

/// A node that has started but not finished decoding.
#[derive(Copy, Clone, Debug)]
struct Frame {
    /// Offset of the node's header; `None` until first visited.
    start: Option<usize>,
    next_pass: NextPass,
    /// Children requested so far across all passes.
    child_count: usize,
}

impl Frame {
    const fn fresh() -> Self {
        Self {
            start: None,
            next_pass: NextPass::Pass(0),
            child_count: 0,
        }
    }
}

/// Children requested by one pass.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct Arity {
    children: usize,
    needs_next_pass: bool,
}

impl Arity {
    const fn leaf() -> Self {
        Self::of(0)
    }

    const fn of(children: usize) -> Self {
        Self {
            children,
            needs_next_pass: false,
        }
    }

    const fn then_again(children: usize) -> Self {
        Self {
            children,
            needs_next_pass: true,
        }
    }
}

/// A decoded node header.
#[derive(Copy, Clone, Debug)]
enum Token {
    Ref,
    Type(Kind, u8),
    Literal(Kind, u8),
}

/// Decodes one stream into an environment.
pub(crate) struct Reader<'a, 'e> {
    cursor: Cursor<'a>,
    env: &'e mut Env,
    /// Preamble name table.
    names: Vec<Name>,
    /// Built nodes that can be referenced, in completion order.
    nodes: Vec<NodeId>,
    frames: Vec<Frame>,
    /// Built nodes waiting for their parent, with their end offsets.
    built: Vec<(NodeId, usize)>,
    /// Frames pushed but not yet visited.
    unstarted: usize,
}

/// Whether the user bits of `code` stay within `allowed`.
#[inline]
const fn only(code: u8, allowed: Markers) -> bool {
    code & USER_MASK & !allowed.bits() == 0
}

impl<'a, 'e> Reader<'a, 'e> {
    pub(crate) fn new(bytes: &'a [u8], env: &'e mut Env) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            env,
            names: Vec::new(),
            nodes: Vec::new(),
            frames: Vec::new(),
            built: Vec::new(),
            unstarted: 0,
        }
    }

    /// Decode the whole stream and return its root.
    pub(crate) fn read(mut self) -> SerialResult<RuntimeNode> {
        let immediate = self.read_begin()?;
        self.read_name_table()?;

        self.push_frames(1)?;
        while let Some(frame) = self.frames.last_mut() {
            match frame.start {
                None => {
                    frame.start = Some(self.cursor.pos());
                    self.unstarted -= 1;
                }
                Some(start) => self.cursor.set_pos(start),
            }

            match frame.next_pass {
                NextPass::Done => {
                    let count = frame.child_count;
                    self.frames.pop();
                    let len = self.built.len();
                    if count > len {
                        return Err(self.corrupted(Corruption::StackMismatch));
                    }
                    self.built[len - count..].reverse();
                    let node = self.read_node()?;
                    self.built.push((node, self.cursor.pos()));
                }
                NextPass::Pass(pass) => {
                    let arity = self.try_read_node(pass)?;
                    let Some(frame) = self.frames.last_mut() else {
                        return Err(self.corrupted(Corruption::StackMismatch));
                    };
                    if arity.needs_next_pass {
                        tracing::trace!(pass, children = arity.children, "node needs another pass");
                    }
                    frame.child_count += arity.children;
                    frame.next_pass = if arity.needs_next_pass {
                        NextPass::Pass(pass + 1)
                    } else {
                        NextPass::Done
                    };
                    self.push_frames(arity.children)?;
                }
            }
        }

        let &[(root, end)] = self.built.as_slice() else {
            return Err(self.corrupted(Corruption::StackMismatch));
        };
        self.cursor.set_pos(end);
        self.read_end()?;

        tracing::trace!(nodes = self.nodes.len(), names = self.names.len(), "stream read");
        Ok(RuntimeNode::new(root, immediate))
    }

    // === Framing ===

    fn read_begin(&mut self) -> SerialResult<bool> {
        let code = self.cursor.read_u8()?;
        if code == SystemCommand::Begin.code() {
            Ok(true)
        } else if code == SystemCommand::BeginNotImmediate.code() {
            Ok(false)
        } else {
            Err(SerialError::corrupted(0, Corruption::BadBeginMarker(code)))
        }
    }

    fn read_name_table(&mut self) -> SerialResult<()> {
        let count = self.cursor.read_count(1)?;
        self.names.reserve(count as usize);
        for _ in 0..count {
            let len = self.cursor.read_var32()?;
            let name = self.read_name_bytes(len)?;
            self.names.push(name);
        }
        Ok(())
    }

    fn read_end(&mut self) -> SerialResult<()> {
        let at = self.cursor.pos();
        let code = self.cursor.read_u8()?;
        if code != SystemCommand::End.code() {
            return Err(SerialError::corrupted(at, Corruption::MissingEnd(code)));
        }
        if !self.cursor.is_at_end() {
            return Err(self.corrupted(Corruption::TrailingBytes {
                count: self.cursor.remaining(),
            }));
        }
        Ok(())
    }

    /// Push `count` unvisited frames.
    ///
    /// Every node takes at least one byte, so more pending frames than
    /// remaining bytes can only come from a corrupted count.
    fn push_frames(&mut self, count: usize) -> SerialResult<()> {
        let pending = self.unstarted.saturating_add(count);
        if pending > self.cursor.remaining() {
            return Err(self.corrupted(Corruption::ChildCountExceedsInput {
                count: count as u64,
                remaining: self.cursor.remaining(),
            }));
        }
        self.unstarted = pending;
        self.frames.resize(self.frames.len() + count, Frame::fresh());
        Ok(())
    }

    fn read_token(&mut self) -> SerialResult<Token> {
        let at = self.cursor.pos();
        let code = self.cursor.read_u8()?;
        let unknown = || SerialError::corrupted(at, Corruption::UnknownCode(code));
        match Header::decode(code) {
            Header::System(_) if code == SystemCommand::Ref.code() => Ok(Token::Ref),
            Header::System(_) => Err(unknown()),
            Header::Type(code) => {
                let kind = match nibble_kind(code).ok_or_else(unknown)? {
                    // User bits carry flags.
                    Kind::Callable if only(code, Markers::MERGE_DISABLED | Markers::HAS_PAYLOAD) => {
                        Kind::Callable
                    }
                    Kind::Callable => return Err(unknown()),
                    _ => extended_kind(code).ok_or_else(unknown)?,
                };
                Ok(Token::Type(kind, code))
            }
            Header::Literal(code) => {
                let kind = match nibble_kind(code).ok_or_else(unknown)? {
                    Kind::Type => {
                        return Err(SerialError::corrupted(at, Corruption::TypeKindLiteral));
                    }
                    Kind::Void => extended_kind(code).ok_or_else(unknown)?,
                    kind @ (Kind::Optional | Kind::Any)
                        if only(code, Markers::HAS_ITEM | Markers::ITEM_IMMEDIATE)
                            && (has(code, Markers::HAS_ITEM) || !has(code, Markers::ITEM_IMMEDIATE)) =>
                    {
                        kind
                    }
                    Kind::Callable if only(code, Markers::HAS_RESULT | Markers::HAS_UNIQUE_ID) => {
                        Kind::Callable
                    }
                    Kind::Variant if only(code, Markers::VARIANT_ITEM_IMMEDIATE) => Kind::Variant,
                    kind @ (Kind::Data
                    | Kind::Struct
                    | Kind::List
                    | Kind::Dict
                    | Kind::Tuple
                    | Kind::Null)
                        if only(code, Markers::empty()) =>
                    {
                        kind
                    }
                    _ => return Err(unknown()),
                };
                Ok(Token::Literal(kind, code))
            }
        }
    }

    // === Arity passes ===

    /// Report the children the node at the cursor needs for this pass.
    fn try_read_node(&mut self, pass: u32) -> SerialResult<Arity> {
        match self.read_token()? {
            Token::Ref => Ok(Arity::leaf()),
            Token::Type(kind, code) => self.try_read_type(kind, code),
            Token::Literal(kind, code) => self.try_read_literal(kind, code, pass),
        }
    }

    fn try_read_type(&mut self, kind: Kind, code: u8) -> SerialResult<Arity> {
        Ok(match kind {
            Kind::Type
            | Kind::Void
            | Kind::EmptyList
            | Kind::EmptyDict
            | Kind::Null
            | Kind::Any
            | Kind::Data
            | Kind::Pg
            | Kind::Resource => Arity::leaf(),
            Kind::Struct | Kind::Tuple | Kind::Multi => Arity::of(self.cursor.read_var32()? as usize),
            Kind::List
            | Kind::Stream
            | Kind::Flow
            | Kind::Block
            | Kind::Optional
            | Kind::Tagged
            | Kind::Variant => Arity::of(1),
            Kind::Dict => Arity::of(2),
            Kind::Callable => {
                let args = self.cursor.read_var32()? as usize;
                let payload = usize::from(has(code, Markers::HAS_PAYLOAD));
                Arity::of(args.saturating_add(1 + payload))
            }
        })
    }

    fn try_read_literal(&mut self, kind: Kind, code: u8, pass: u32) -> SerialResult<Arity> {
        Ok(match kind {
            Kind::Void | Kind::EmptyList | Kind::EmptyDict | Kind::Null => Arity::leaf(),
            Kind::Data => Arity::of(1),
            Kind::Variant => Arity::of(2),
            Kind::Callable if has(code, Markers::HAS_RESULT) => Arity::of(2),
            Kind::Struct | Kind::Tuple | Kind::Callable => match pass {
                0 => Arity::then_again(1),
                _ => Arity::of(self.peek_member_count(kind)?),
            },
            Kind::List => Arity::of((self.cursor.read_var32()? as usize).saturating_add(1)),
            Kind::Dict => {
                let pairs = self.cursor.read_var32()? as usize;
                Arity::of(pairs.saturating_mul(2).saturating_add(1))
            }
            Kind::Optional => Arity::of(if has(code, Markers::HAS_ITEM) { 2 } else { 1 }),
            Kind::Any => Arity::of(usize::from(has(code, Markers::HAS_ITEM))),
            Kind::Type
            | Kind::Resource
            | Kind::Stream
            | Kind::Flow
            | Kind::Block
            | Kind::Tagged
            | Kind::Pg
            | Kind::Multi => return Err(self.corrupted(Corruption::UnknownCode(code))),
        })
    }

    /// Look at the type a two-pass literal has just built, without popping
    /// it, and move the cursor past its encoding.
    ///
    /// Returns the number of values the literal holds.
    fn peek_member_count(&mut self, kind: Kind) -> SerialResult<usize> {
        let Some(&(node, end)) = self.built.last() else {
            return Err(self.corrupted(Corruption::StackMismatch));
        };
        self.cursor.set_pos(end);
        self.check_type(node, Some(kind))?;
        self.member_count(node)
    }

    /// Values a literal of type `ty` holds: members, elements or arguments.
    fn member_count(&self, ty: NodeId) -> SerialResult<usize> {
        match self.env.get(ty) {
            Node::StructType { members } => Ok(members.len()),
            Node::TupleType { elements } => Ok(elements.len()),
            Node::CallableType(sig) => Ok(sig.args.len()),
            _ => Err(self.corrupted(Corruption::StackMismatch)),
        }
    }

    // === Final pass ===

    /// Pop the built children and build the node at the cursor.
    fn read_node(&mut self) -> SerialResult<NodeId> {
        let at = self.cursor.pos();
        let node = match self.read_token()? {
            Token::Ref => {
                let index = self.cursor.read_var32()?;
                let len = self.nodes.len();
                return self
                    .nodes
                    .get(index as usize)
                    .copied()
                    .ok_or_else(|| SerialError::corrupted(at, Corruption::RefOutOfRange { index, len }));
            }
            Token::Type(kind, code) => {
                if let Some(id) = self.env.singleton(kind, true) {
                    return Ok(id);
                }
                self.read_type(kind, code)?
            }
            Token::Literal(kind, code) => {
                if let Some(id) = self.env.singleton(kind, false) {
                    return Ok(id);
                }
                self.read_literal(kind, code)?
            }
        };
        self.nodes.push(node);
        Ok(node)
    }

    fn read_type(&mut self, kind: Kind, code: u8) -> SerialResult<NodeId> {
        let env_result = match kind {
            Kind::Data => {
                let id = self.cursor.read_var32()?;
                let decimal = if id == u32::from(DataSlot::Decimal.id()) {
                    let [precision, scale] = self.cursor.read_array()?;
                    Some(DecimalParams::new(precision, scale))
                } else {
                    None
                };
                self.env.data_type_by_id(id, decimal)
            }
            Kind::Pg => {
                let type_id = self.cursor.read_var32()?;
                self.env.pg_type(type_id)
            }
            Kind::Resource => {
                let tag = self.read_name()?;
                self.env.resource_type(tag)
            }
            Kind::Struct => {
                let count = self.cursor.read_var32()?;
                let types = self.pop_types(count as usize)?;
                let mut members = Vec::with_capacity(types.len());
                for ty in types {
                    members.push(StructMember {
                        name: self.read_name()?,
                        ty,
                    });
                }
                self.env.struct_type(members)
            }
            Kind::Tuple | Kind::Multi => {
                let count = self.cursor.read_var32()?;
                let elements = self.pop_types(count as usize)?;
                if kind == Kind::Tuple {
                    self.env.tuple_type(elements)
                } else {
                    self.env.multi_type(elements)
                }
            }
            Kind::List => {
                let item = self.pop_type()?;
                self.env.list_type(item)
            }
            Kind::Stream => {
                let item = self.pop_type()?;
                self.env.stream_type(item)
            }
            Kind::Flow => {
                let item = self.pop_type()?;
                self.env.flow_type(item)
            }
            Kind::Optional => {
                let item = self.pop_type()?;
                self.env.optional_type(item)
            }
            Kind::Variant => {
                let underlying = self.pop_type()?;
                self.env.variant_type(underlying)
            }
            Kind::Block => {
                let item = self.pop_type()?;
                let at = self.cursor.pos();
                let raw = self.cursor.read_u8()?;
                let shape = BlockShape::from_raw(raw)
                    .ok_or_else(|| SerialError::corrupted(at, Corruption::InvalidBlockShape(raw)))?;
                self.env.block_type(item, shape)
            }
            Kind::Tagged => {
                let base = self.pop_type()?;
                let tag = self.read_name()?;
                self.env.tagged_type(base, tag)
            }
            Kind::Dict => {
                let key = self.pop_type()?;
                let payload = self.pop_type()?;
                self.env.dict_type(key, payload)
            }
            Kind::Callable => {
                let arg_count = self.cursor.read_var32()?;
                let ret = self.pop_type()?;
                let args = self.pop_types(arg_count as usize)?;
                let payload = if has(code, Markers::HAS_PAYLOAD) {
                    Some(self.pop_node()?)
                } else {
                    None
                };
                let name = self.read_name()?;
                let optional_args = self.cursor.read_var32()?;

                let mut sig = CallableSig::new(name, ret, args).with_optional_args(optional_args);
                if let Some(payload) = payload {
                    sig = sig.with_payload(payload);
                }
                if has(code, Markers::MERGE_DISABLED) {
                    sig = sig.merge_disabled();
                }
                self.env.callable_type(sig)
            }
            // Singletons never get here.
            Kind::Type | Kind::Void | Kind::EmptyList | Kind::EmptyDict | Kind::Null | Kind::Any => {
                return Err(self.corrupted(Corruption::UnknownCode(code)));
            }
        };
        Ok(env_result?)
    }

    fn read_literal(&mut self, kind: Kind, code: u8) -> SerialResult<NodeId> {
        let env_result = match kind {
            Kind::Data => {
                let ty = self.pop_type_of(Kind::Data)?;
                let Node::DataType { slot, .. } = *self.env.get(ty) else {
                    return Err(self.corrupted(Corruption::StackMismatch));
                };
                match read_scalar(&mut self.cursor, slot)? {
                    (value, Some(tz)) => self.env.tz_data_literal(ty, value, tz),
                    (value, None) => self.env.data_literal(ty, value),
                }
            }
            Kind::Struct => {
                let ty = self.pop_type_of(Kind::Struct)?;
                let count = self.member_count(ty)?;
                let values = self.pop_links(count)?;
                self.env.struct_literal(ty, values)
            }
            Kind::Tuple => {
                let ty = self.pop_type_of(Kind::Tuple)?;
                let count = self.member_count(ty)?;
                let values = self.pop_links(count)?;
                self.env.tuple_literal(ty, values)
            }
            Kind::List => {
                let count = self.cursor.read_var32()?;
                let ty = self.pop_type_of(Kind::List)?;
                let items = self.pop_links(count as usize)?;
                self.env.list_literal(ty, items)
            }
            Kind::Optional => {
                let ty = self.pop_type_of(Kind::Optional)?;
                let item = self.pop_item(code)?;
                self.env.optional_literal(ty, item)
            }
            Kind::Any => {
                let item = self.pop_item(code)?;
                self.env.any_literal(item)
            }
            Kind::Dict => {
                let pairs = self.cursor.read_var32()? as usize;
                let ty = self.pop_type_of(Kind::Dict)?;
                let flat = self.pop_links(pairs.saturating_mul(2))?;
                let items = flat.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
                self.env.dict_literal(ty, items)
            }
            Kind::Callable => {
                let ty = self.pop_type_of(Kind::Callable)?;
                let body = if has(code, Markers::HAS_RESULT) {
                    let result = self.pop_node()?;
                    let immediate = self.cursor.read_u8()? != 0;
                    CallableBody::Result(RuntimeNode::new(result, immediate))
                } else {
                    let count = self.member_count(ty)?;
                    CallableBody::Inputs(self.pop_links(count)?)
                };
                let unique_id = if has(code, Markers::HAS_UNIQUE_ID) {
                    self.cursor.read_var32()?
                } else {
                    0
                };
                self.env.callable(ty, body, unique_id)
            }
            Kind::Variant => {
                let ty = self.pop_type_of(Kind::Variant)?;
                let item = self.pop_node()?;
                let immediate = has(code, Markers::VARIANT_ITEM_IMMEDIATE);
                let index = self.cursor.read_var32()?;
                self.env.variant_literal(ty, RuntimeNode::new(item, immediate), index)
            }
            _ => return Err(self.corrupted(Corruption::UnknownCode(code))),
        };
        Ok(env_result?)
    }

    // === Child stack ===

    /// Pop the next child and move the cursor past its encoding.
    fn pop_node(&mut self) -> SerialResult<NodeId> {
        let Some((node, end)) = self.built.pop() else {
            return Err(self.corrupted(Corruption::StackMismatch));
        };
        self.cursor.set_pos(end);
        Ok(node)
    }

    fn pop_type(&mut self) -> SerialResult<NodeId> {
        let node = self.pop_node()?;
        self.check_type(node, None)?;
        Ok(node)
    }

    fn pop_type_of(&mut self, kind: Kind) -> SerialResult<NodeId> {
        let node = self.pop_node()?;
        self.check_type(node, Some(kind))?;
        Ok(node)
    }

    fn pop_types(&mut self, count: usize) -> SerialResult<Vec<NodeId>> {
        (0..count).map(|_| self.pop_type()).collect()
    }

    /// Pop `count` children and pair them with the immediacy bitmap that
    /// follows them.
    fn pop_links(&mut self, count: usize) -> SerialResult<Vec<RuntimeNode>> {
        let nodes = (0..count)
            .map(|_| self.pop_node())
            .collect::<SerialResult<Vec<_>>>()?;
        let bitmap = self.cursor.read_bytes(bitmap_len(count))?;
        Ok(nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| RuntimeNode::new(node, get_bit(bitmap, i)))
            .collect())
    }

    /// Item of an Optional or Any literal, described by its header flags.
    fn pop_item(&mut self, code: u8) -> SerialResult<Option<RuntimeNode>> {
        if !has(code, Markers::HAS_ITEM) {
            return Ok(None);
        }
        let node = self.pop_node()?;
        Ok(Some(RuntimeNode::new(node, has(code, Markers::ITEM_IMMEDIATE))))
    }

    fn check_type(&self, node: NodeId, kind: Option<Kind>) -> SerialResult<()> {
        if !self.env.is_type(node) {
            return Err(self.corrupted(Corruption::NotAType));
        }
        let found = self.env.kind(node);
        match kind {
            Some(expected) if expected != found => {
                Err(self.corrupted(Corruption::WrongTypeKind { expected, found }))
            }
            _ => Ok(()),
        }
    }

    // === Names ===

    fn read_name(&mut self) -> SerialResult<Name> {
        let at = self.cursor.pos();
        match NameDescriptor::decode(self.cursor.read_var32()?) {
            NameDescriptor::Table(index) => self.names.get(index as usize).copied().ok_or(
                SerialError::corrupted(
                    at,
                    Corruption::NameOutOfRange {
                        index,
                        len: self.names.len(),
                    },
                ),
            ),
            NameDescriptor::Inline(len) => self.read_name_bytes(len),
        }
    }

    fn read_name_bytes(&mut self, len: u32) -> SerialResult<Name> {
        let at = self.cursor.pos();
        let bytes = self.cursor.read_bytes(len as usize)?;
        let text =
            std::str::from_utf8(bytes).map_err(|_| SerialError::corrupted(at, Corruption::InvalidName))?;
        Ok(self.env.intern(text)?)
    }

    fn corrupted(&self, kind: Corruption) -> SerialError {
        SerialError::corrupted(self.cursor.pos(), kind)
    }
}
