//! Graph to bytes.
//!
//! The writer walks the graph with an explicit stack of `(node, visited)`
//! frames. On the first visit a node writes its header and inline fields
//! and pushes its children in reverse, so they come off the stack (and land
//! in the stream) in logical order. On the second visit, after all of its
//! children are written, it writes its trailing fields (names, immediacy
//! bitmaps, scalar payloads) and receives its cookie.
//!
//! A node that already has a cookie is written as a `Ref` to it instead.
//! Singletons are written as their bare header and never get a cookie.

use kql_ir::{CallableBody, Env, Kind, Name, Node, NodeId, RuntimeNode};

use crate::header::{
    bitmap_len, literal_code, set_bit, type_code, Markers, SystemCommand,
};
use crate::names::{NameDescriptor, NameTable};
use crate::scalar::{wire_len, write_scalar};
use crate::session::Session;
use crate::varint::write_var32;

/// Encodes one graph into a byte buffer.
pub(crate) struct Writer<'a> {
    env: &'a Env,
    names: &'a NameTable,
    session: Session,
    out: Vec<u8>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(env: &'a Env, names: &'a NameTable, capacity: usize) -> Self {
        Self {
            env,
            names,
            session: Session::new(),
            out: Vec::with_capacity(capacity),
            stack: Vec::new(),
        }
    }

    /// Write the whole stream for `root` and return it.
    pub(crate) fn write(mut self, root: RuntimeNode) -> Vec<u8> {
        self.begin(root.immediate);

        self.stack.push((root.node, false));
        while let Some(&(id, visited)) = self.stack.last() {
            if visited {
                self.post_visit(id);
                self.stack.pop();
                continue;
            }

            let top = self.stack.len() - 1;
            self.stack[top].1 = true;
            if self.pre_visit(id) {
                debug_assert_eq!(self.stack.len(), top + 1, "processed node pushed children");
                self.stack.pop();
            }
        }

        self.end();
        tracing::trace!(cookies = self.session.len(), bytes = self.out.len(), "stream written");
        self.out
    }

    fn begin(&mut self, immediate: bool) {
        self.out.push(SystemCommand::begin(immediate).code());
        write_var32(&mut self.out, wire_len(self.names.len()));
        for &name in self.names.entries() {
            let text = self.env.name_str(name);
            write_var32(&mut self.out, wire_len(text.len()));
            self.out.extend_from_slice(text.as_bytes());
        }
    }

    fn end(&mut self) {
        self.out.push(SystemCommand::End.code());
    }

    // === Pre-visit ===

    /// Write the header and inline fields and push children.
    ///
    /// Returns `true` when the node is complete (singleton or reference)
    /// and has no post-visit.
    fn pre_visit(&mut self, id: NodeId) -> bool {
        let env = self.env;
        let node = env.get(id);

        if node.is_singleton() {
            let code = if node.is_type() {
                type_code(node.kind(), Markers::empty())
            } else {
                literal_code(node.kind(), Markers::empty())
            };
            self.out.push(code);
            return true;
        }

        if let Some(cookie) = self.session.cookie(id) {
            self.out.push(SystemCommand::Ref.code());
            write_var32(&mut self.out, cookie - 1);
            return true;
        }

        match node {
            // Singletons returned above.
            Node::TypeType
            | Node::VoidType
            | Node::NullType
            | Node::EmptyListType
            | Node::EmptyDictType
            | Node::AnyType
            | Node::Void
            | Node::Null
            | Node::EmptyList
            | Node::EmptyDict => return true,

            Node::DataType { slot, decimal } => {
                self.write_type_code(Kind::Data, Markers::empty());
                write_var32(&mut self.out, u32::from(slot.id()));
                if let Some(params) = decimal {
                    self.out.push(params.precision);
                    self.out.push(params.scale);
                }
            }
            Node::PgType { type_id } => {
                self.write_type_code(Kind::Pg, Markers::empty());
                write_var32(&mut self.out, *type_id);
            }
            Node::StructType { members } => {
                self.write_type_code(Kind::Struct, Markers::empty());
                write_var32(&mut self.out, wire_len(members.len()));
                self.push_reversed(members.iter().map(|m| m.ty));
            }
            Node::ListType { item } => self.write_wrapper(Kind::List, *item),
            Node::StreamType { item } => self.write_wrapper(Kind::Stream, *item),
            Node::FlowType { item } => self.write_wrapper(Kind::Flow, *item),
            Node::BlockType { item, .. } => self.write_wrapper(Kind::Block, *item),
            Node::OptionalType { item } => self.write_wrapper(Kind::Optional, *item),
            Node::TaggedType { base, .. } => self.write_wrapper(Kind::Tagged, *base),
            Node::VariantType { underlying } => self.write_wrapper(Kind::Variant, *underlying),
            Node::DictType { key, payload } => {
                self.write_type_code(Kind::Dict, Markers::empty());
                self.push(*payload);
                self.push(*key);
            }
            Node::CallableType(sig) => {
                let mut flags = Markers::empty();
                flags.set(Markers::MERGE_DISABLED, sig.merge_disabled);
                flags.set(Markers::HAS_PAYLOAD, sig.payload.is_some());
                self.write_type_code(Kind::Callable, flags);
                write_var32(&mut self.out, wire_len(sig.args.len()));
                if let Some(payload) = sig.payload {
                    self.push(payload);
                }
                self.push_reversed(sig.args.iter().copied());
                self.push(sig.ret);
            }
            Node::TupleType { elements } => {
                self.write_type_code(Kind::Tuple, Markers::empty());
                write_var32(&mut self.out, wire_len(elements.len()));
                self.push_reversed(elements.iter().copied());
            }
            Node::MultiType { elements } => {
                self.write_type_code(Kind::Multi, Markers::empty());
                write_var32(&mut self.out, wire_len(elements.len()));
                self.push_reversed(elements.iter().copied());
            }
            Node::ResourceType { tag } => {
                self.write_type_code(Kind::Resource, Markers::empty());
                self.write_name(*tag);
            }

            Node::DataLiteral { ty, .. } => {
                self.write_literal_code(Kind::Data, Markers::empty());
                self.push(*ty);
            }
            Node::StructLiteral { ty, values } => {
                self.write_literal_code(Kind::Struct, Markers::empty());
                self.push_links_reversed(values);
                self.push(*ty);
            }
            Node::TupleLiteral { ty, values } => {
                self.write_literal_code(Kind::Tuple, Markers::empty());
                self.push_links_reversed(values);
                self.push(*ty);
            }
            Node::ListLiteral { ty, items } => {
                self.write_literal_code(Kind::List, Markers::empty());
                write_var32(&mut self.out, wire_len(items.len()));
                self.push_links_reversed(items);
                self.push(*ty);
            }
            Node::OptionalLiteral { ty, item } => {
                self.write_literal_code(Kind::Optional, item_flags(*item));
                if let Some(item) = item {
                    self.push(item.node);
                }
                self.push(*ty);
            }
            Node::DictLiteral { ty, items } => {
                self.write_literal_code(Kind::Dict, Markers::empty());
                write_var32(&mut self.out, wire_len(items.len()));
                for (key, payload) in items.iter().rev() {
                    self.push(payload.node);
                    self.push(key.node);
                }
                self.push(*ty);
            }
            Node::Callable { ty, body, unique_id } => {
                let mut flags = Markers::empty();
                flags.set(Markers::HAS_RESULT, matches!(body, CallableBody::Result(_)));
                flags.set(Markers::HAS_UNIQUE_ID, *unique_id != 0);
                self.write_literal_code(Kind::Callable, flags);
                match body {
                    CallableBody::Result(result) => self.push(result.node),
                    CallableBody::Inputs(inputs) => self.push_links_reversed(inputs),
                }
                self.push(*ty);
            }
            Node::AnyLiteral { item } => {
                self.write_literal_code(Kind::Any, item_flags(*item));
                if let Some(item) = item {
                    self.push(item.node);
                }
            }
            Node::VariantLiteral { ty, item, .. } => {
                let mut flags = Markers::empty();
                flags.set(Markers::VARIANT_ITEM_IMMEDIATE, item.immediate);
                self.write_literal_code(Kind::Variant, flags);
                self.push(item.node);
                self.push(*ty);
            }
        }
        false
    }

    // === Post-visit ===

    /// Write trailing fields and register the node's cookie.
    fn post_visit(&mut self, id: NodeId) {
        let env = self.env;
        match env.get(id) {
            Node::StructType { members } => {
                for member in members {
                    self.write_name(member.name);
                }
            }
            Node::BlockType { shape, .. } => self.out.push(*shape as u8),
            Node::TaggedType { tag, .. } => self.write_name(*tag),
            Node::CallableType(sig) => {
                self.write_name(sig.name);
                write_var32(&mut self.out, sig.optional_args);
            }

            Node::DataLiteral { value, tz, .. } => write_scalar(&mut self.out, value, *tz),
            Node::StructLiteral { values, .. } | Node::TupleLiteral { values, .. } => {
                self.write_bitmap(values.iter().map(|v| v.immediate), values.len());
            }
            Node::ListLiteral { items, .. } => {
                self.write_bitmap(items.iter().map(|v| v.immediate), items.len());
            }
            Node::DictLiteral { items, .. } => {
                let flags = items.iter().flat_map(|(k, p)| [k.immediate, p.immediate]);
                self.write_bitmap(flags, items.len() * 2);
            }
            Node::Callable { body, unique_id, .. } => {
                match body {
                    CallableBody::Result(result) => self.out.push(u8::from(result.immediate)),
                    CallableBody::Inputs(inputs) => {
                        self.write_bitmap(inputs.iter().map(|v| v.immediate), inputs.len());
                    }
                }
                if *unique_id != 0 {
                    write_var32(&mut self.out, *unique_id);
                }
            }
            Node::VariantLiteral { index, .. } => write_var32(&mut self.out, *index),
            _ => {}
        }
        self.session.register(id);
    }

    // === Helpers ===

    fn write_type_code(&mut self, kind: Kind, flags: Markers) {
        self.out.push(type_code(kind, flags));
    }

    fn write_literal_code(&mut self, kind: Kind, flags: Markers) {
        self.out.push(literal_code(kind, flags));
    }

    fn write_wrapper(&mut self, kind: Kind, inner: NodeId) {
        self.write_type_code(kind, Markers::empty());
        self.push(inner);
    }

    fn write_name(&mut self, name: Name) {
        if let Some(descriptor) = self.names.reference(name) {
            write_var32(&mut self.out, descriptor);
        } else {
            let text = self.env.name_str(name);
            write_var32(&mut self.out, NameDescriptor::inline(wire_len(text.len())));
            self.out.extend_from_slice(text.as_bytes());
        }
    }

    fn write_bitmap(&mut self, flags: impl Iterator<Item = bool>, bits: usize) {
        let start = self.out.len();
        self.out.resize(start + bitmap_len(bits), 0);
        let bitmap = &mut self.out[start..];
        for (i, immediate) in flags.enumerate() {
            if immediate {
                set_bit(bitmap, i);
            }
        }
    }

    #[inline]
    fn push(&mut self, id: NodeId) {
        self.stack.push((id, false));
    }

    fn push_reversed(&mut self, ids: impl DoubleEndedIterator<Item = NodeId>) {
        self.stack.extend(ids.rev().map(|id| (id, false)));
    }

    fn push_links_reversed(&mut self, links: &[RuntimeNode]) {
        self.push_reversed(links.iter().map(|link| link.node));
    }
}

fn item_flags(item: Option<RuntimeNode>) -> Markers {
    let mut flags = Markers::empty();
    if let Some(item) = item {
        flags |= Markers::HAS_ITEM;
        flags.set(Markers::ITEM_IMMEDIATE, item.immediate);
    }
    flags
}
