//! Name table sub-protocol.
//!
//! Before writing, every name carried by a reachable node (struct member
//! names, callable names, resource tags, tagged-type tags) is counted.
//! Names used two or more times go into the preamble once, in
//! first-occurrence order, and are referred to by index afterwards. Names
//! used once are written inline where they occur.
//!
//! A name descriptor is a var32: `(index << 1) | 1` for a table entry, or
//! `length << 1` followed by the raw bytes for an inline name.

use kql_ir::{Env, Name, NodeId};
use rustc_hash::FxHashMap;

use crate::header::NAME_REF_MARK;

/// Writer-side name table.
#[derive(Default, Debug)]
pub struct NameTable {
    /// Table index of each interned name.
    index: FxHashMap<Name, u32>,
    /// Interned names in table order.
    entries: Vec<Name>,
}

impl NameTable {
    /// Empty table; every name is written inline.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Count names over `nodes` and intern the repeated ones.
    pub fn collect(env: &Env, nodes: &[NodeId]) -> Self {
        let mut counts: FxHashMap<Name, u32> = FxHashMap::default();
        let mut order = Vec::new();
        for &id in nodes {
            for name in env.get(id).names() {
                let count = counts.entry(name).or_insert(0);
                if *count == 0 {
                    order.push(name);
                }
                *count += 1;
            }
        }

        let mut table = Self::default();
        for name in order {
            if counts.get(&name).copied().unwrap_or(0) >= 2 {
                let next = u32::try_from(table.entries.len()).unwrap_or(u32::MAX);
                table.index.insert(name, next);
                table.entries.push(name);
            }
        }
        table
    }

    /// Interned names, in preamble order.
    pub fn entries(&self) -> &[Name] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor for a name; `None` means the name is written inline.
    pub fn reference(&self, name: Name) -> Option<u32> {
        self.index.get(&name).map(|&i| (i << 1) | NAME_REF_MARK)
    }
}

/// A decoded name descriptor.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NameDescriptor {
    /// Index into the preamble table.
    Table(u32),
    /// Inline name of this many bytes.
    Inline(u32),
}

impl NameDescriptor {
    pub const fn decode(raw: u32) -> Self {
        if raw & NAME_REF_MARK != 0 {
            Self::Table(raw >> 1)
        } else {
            Self::Inline(raw >> 1)
        }
    }

    /// Descriptor of an inline name of `len` bytes.
    pub const fn inline(len: u32) -> u32 {
        len << 1
    }
}
