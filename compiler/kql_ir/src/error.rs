//! Construction errors raised by the [`Env`](crate::Env).

use crate::data::{DataSlot, Layout};
use crate::interner::InternError;
use crate::{Kind, NodeId};

/// The environment refused to build a node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("unknown data type id {id}")]
    UnknownDataType { id: u32 },

    #[error("data type {slot} needs decimal parameters")]
    MissingDecimalParams { slot: DataSlot },

    #[error("data type {slot} does not take decimal parameters")]
    UnexpectedDecimalParams { slot: DataSlot },

    #[error("invalid decimal parameters ({precision}, {scale})")]
    InvalidDecimalParams { precision: u8, scale: u8 },

    #[error("decimal value {value} does not fit in 120 bits")]
    DecimalOutOfRange { value: i128 },

    #[error("unknown timezone id {id}, table has {count} entries")]
    InvalidTimezone { id: u32, count: u32 },

    #[error("data type {slot} needs a timezone")]
    MissingTimezone { slot: DataSlot },

    #[error("data type {slot} does not carry a timezone")]
    UnexpectedTimezone { slot: DataSlot },

    #[error("value layout {found:?} does not match {slot} (expected {expected:?})")]
    LayoutMismatch {
        slot: DataSlot,
        expected: Layout,
        found: Layout,
    },

    #[error("invalid UTF-8 in {slot} value")]
    InvalidUtf8 { slot: DataSlot },

    #[error("{kind} literal has {found} children, its type expects {expected}")]
    ArityMismatch {
        kind: Kind,
        expected: usize,
        found: usize,
    },

    #[error("node {node} is not a type")]
    NotAType { node: NodeId },

    #[error("expected a {expected} type, found {found}")]
    WrongTypeKind { expected: Kind, found: Kind },

    #[error("variant underlying type must be a tuple or struct, found {found}")]
    InvalidVariantUnderlying { found: Kind },

    #[error("variant index {index} out of range for {count} alternatives")]
    VariantIndexOutOfRange { index: u32, count: usize },

    #[error("node {node} does not exist")]
    DanglingNode { node: NodeId },

    #[error("arena exceeded capacity: {count} nodes")]
    ArenaOverflow { count: usize },

    #[error(transparent)]
    Intern(#[from] InternError),
}
