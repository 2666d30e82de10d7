//! Node formatting for debugging and error messages.

#![allow(clippy::format_push_string)] // Debug formatting prioritizes clarity over allocation

use crate::node::{CallableBody, Node};
use crate::{Env, NodeId, RuntimeNode};

/// Nesting depth past which children render as `...`.
const MAX_DEPTH: usize = 32;

impl Env {
    /// Format a node as a human-readable string.
    pub fn format_node(&self, id: NodeId) -> String {
        let mut buf = String::new();
        self.format_node_into(id, &mut buf);
        buf
    }

    /// Format a node into an existing string buffer.
    pub fn format_node_into(&self, id: NodeId, buf: &mut String) {
        self.format_at(id, buf, 0);
    }

    fn format_at(&self, id: NodeId, buf: &mut String, depth: usize) {
        let Some(node) = self.try_get(id) else {
            buf.push_str("<dangling>");
            return;
        };
        if depth >= MAX_DEPTH {
            buf.push_str("...");
            return;
        }
        let depth = depth + 1;

        match node {
            Node::TypeType => buf.push_str("Type"),
            Node::VoidType => buf.push_str("Void"),
            Node::NullType => buf.push_str("Null"),
            Node::EmptyListType => buf.push_str("EmptyList"),
            Node::EmptyDictType => buf.push_str("EmptyDict"),
            Node::AnyType => buf.push_str("Any"),
            Node::DataType { slot, decimal } => match decimal {
                Some(params) => buf.push_str(&format!(
                    "Decimal({},{})",
                    params.precision, params.scale
                )),
                None => buf.push_str(&slot.to_string()),
            },
            Node::PgType { type_id } => buf.push_str(&format!("Pg<{type_id}>")),
            Node::StructType { members } => {
                buf.push_str("Struct<");
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    buf.push_str(self.name_str(member.name));
                    buf.push_str(": ");
                    self.format_at(member.ty, buf, depth);
                }
                buf.push('>');
            }
            Node::ListType { item } => self.format_wrapped("List", *item, buf, depth),
            Node::StreamType { item } => self.format_wrapped("Stream", *item, buf, depth),
            Node::FlowType { item } => self.format_wrapped("Flow", *item, buf, depth),
            Node::OptionalType { item } => self.format_wrapped("Optional", *item, buf, depth),
            Node::VariantType { underlying } => {
                self.format_wrapped("Variant", *underlying, buf, depth);
            }
            Node::BlockType { item, shape } => {
                buf.push_str("Block<");
                self.format_at(*item, buf, depth);
                buf.push_str(&format!(", {shape:?}>"));
            }
            Node::TaggedType { base, tag } => {
                buf.push_str("Tagged<");
                self.format_at(*base, buf, depth);
                buf.push_str(&format!(", '{}'>", self.name_str(*tag)));
            }
            Node::DictType { key, payload } => {
                buf.push_str("Dict<");
                self.format_at(*key, buf, depth);
                buf.push_str(", ");
                self.format_at(*payload, buf, depth);
                buf.push('>');
            }
            Node::CallableType(sig) => {
                buf.push_str(&format!("Callable<'{}'(", self.name_str(sig.name)));
                self.format_list(sig.args.iter().copied(), buf, depth);
                buf.push_str(")->");
                self.format_at(sig.ret, buf, depth);
                buf.push('>');
            }
            Node::TupleType { elements } => {
                buf.push_str("Tuple<");
                self.format_list(elements.iter().copied(), buf, depth);
                buf.push('>');
            }
            Node::MultiType { elements } => {
                buf.push_str("Multi<");
                self.format_list(elements.iter().copied(), buf, depth);
                buf.push('>');
            }
            Node::ResourceType { tag } => {
                buf.push_str(&format!("Resource<'{}'>", self.name_str(*tag)));
            }

            Node::Void => buf.push_str("void"),
            Node::Null => buf.push_str("null"),
            Node::EmptyList => buf.push_str("[]"),
            Node::EmptyDict => buf.push_str("{}"),
            Node::DataLiteral { value, tz, .. } => {
                buf.push_str(&value.to_string());
                if let Some(tz) = tz {
                    buf.push_str(&format!("@tz{tz}"));
                }
            }
            Node::StructLiteral { ty, values } => {
                let names: Vec<&str> = match self.get(*ty) {
                    Node::StructType { members } => {
                        members.iter().map(|m| self.name_str(m.name)).collect()
                    }
                    _ => Vec::new(),
                };
                buf.push('{');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    buf.push_str(names.get(i).copied().unwrap_or("?"));
                    buf.push_str(": ");
                    self.format_at(value.node, buf, depth);
                }
                buf.push('}');
            }
            Node::ListLiteral { items, .. } => {
                buf.push('[');
                self.format_links(items, buf, depth);
                buf.push(']');
            }
            Node::OptionalLiteral { item, .. } => match item {
                Some(item) => {
                    buf.push_str("Some(");
                    self.format_at(item.node, buf, depth);
                    buf.push(')');
                }
                None => buf.push_str("None"),
            },
            Node::DictLiteral { items, .. } => {
                buf.push('{');
                for (i, (key, payload)) in items.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    self.format_at(key.node, buf, depth);
                    buf.push_str(": ");
                    self.format_at(payload.node, buf, depth);
                }
                buf.push('}');
            }
            Node::Callable { ty, body, .. } => {
                let name = match self.get(*ty) {
                    Node::CallableType(sig) => self.name_str(sig.name),
                    _ => "?",
                };
                buf.push_str(name);
                match body {
                    CallableBody::Result(result) => {
                        buf.push_str(" => ");
                        self.format_at(result.node, buf, depth);
                    }
                    CallableBody::Inputs(inputs) => {
                        buf.push('(');
                        self.format_links(inputs, buf, depth);
                        buf.push(')');
                    }
                }
            }
            Node::AnyLiteral { item } => match item {
                Some(item) => {
                    buf.push_str("any(");
                    self.format_at(item.node, buf, depth);
                    buf.push(')');
                }
                None => buf.push_str("any"),
            },
            Node::TupleLiteral { values, .. } => {
                buf.push('(');
                self.format_links(values, buf, depth);
                buf.push(')');
            }
            Node::VariantLiteral { item, index, .. } => {
                buf.push_str(&format!("#{index}("));
                self.format_at(item.node, buf, depth);
                buf.push(')');
            }
        }
    }

    fn format_wrapped(&self, label: &str, inner: NodeId, buf: &mut String, depth: usize) {
        buf.push_str(label);
        buf.push('<');
        self.format_at(inner, buf, depth);
        buf.push('>');
    }

    fn format_list(&self, ids: impl Iterator<Item = NodeId>, buf: &mut String, depth: usize) {
        for (i, id) in ids.enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            self.format_at(id, buf, depth);
        }
    }

    fn format_links(&self, links: &[RuntimeNode], buf: &mut String, depth: usize) {
        self.format_list(links.iter().map(|link| link.node), buf, depth);
    }
}
