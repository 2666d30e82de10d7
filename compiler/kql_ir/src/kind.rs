//! Node kind tag.
//!
//! Each node in the environment has a `Kind` that identifies its structural
//! category. Type nodes and literal nodes share the same tag space: a Struct
//! type and a Struct literal both have `Kind::Struct`, and the node itself
//! says which family it belongs to.
//!
//! # Tag layout
//!
//! The low nibble (0-14) is the base kind. Nibble 15 is reserved for system
//! commands on the wire. Extended kinds reuse a base nibble and set bits
//! 4-6 to tell themselves apart:
//!
//! - `EmptyList` / `EmptyDict`: nibble of `Void`
//! - `Tagged`: nibble of `Optional`
//! - `Block`: nibble of `Flow`
//! - `Pg`: nibble of `Data`
//! - `Multi`: nibble of `Tuple`

use std::fmt;

/// Node kind discriminant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum Kind {
    // === Base kinds (0-14) ===
    /// Type of types.
    Type = 0x00,
    /// Void.
    Void = 0x01,
    /// Scalar data described by a scheme type.
    Data = 0x02,
    /// Struct with named members.
    Struct = 0x03,
    /// Homogeneous list.
    List = 0x04,
    /// Optional value.
    Optional = 0x05,
    /// Dictionary.
    Dict = 0x06,
    /// Callable (function type / call node).
    Callable = 0x07,
    /// Dynamically typed value.
    Any = 0x08,
    /// Positional tuple.
    Tuple = 0x09,
    /// Opaque resource identified by a tag.
    Resource = 0x0a,
    /// Variant over a tuple or struct.
    Variant = 0x0b,
    /// Lazy stream.
    Stream = 0x0c,
    /// Null.
    Null = 0x0d,
    /// Flow.
    Flow = 0x0e,

    // Nibble 0x0f is reserved for system commands.

    // === Extended kinds ===
    /// Empty list (shares the `Void` nibble).
    EmptyList = 0x11,
    /// Empty dictionary (shares the `Void` nibble).
    EmptyDict = 0x21,
    /// Tagged type (shares the `Optional` nibble).
    Tagged = 0x15,
    /// Block type (shares the `Flow` nibble).
    Block = 0x1e,
    /// Postgres type (shares the `Data` nibble).
    Pg = 0x12,
    /// Multi type (shares the `Tuple` nibble).
    Multi = 0x19,
}

impl Kind {
    /// Mask selecting the base nibble.
    pub const NIBBLE_MASK: u8 = 0x0f;

    /// Mask selecting the full 7-bit kind (base nibble plus extension bits).
    pub const FULL_MASK: u8 = 0x7f;

    /// Reserved nibble; never a node kind.
    pub const RESERVED_NIBBLE: u8 = 0x0f;

    /// Raw tag value.
    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// The base nibble this kind is dispatched on.
    #[inline]
    pub const fn nibble(self) -> u8 {
        self.raw() & Self::NIBBLE_MASK
    }

    /// Decode a full 7-bit kind value.
    ///
    /// Returns `None` for values that name no kind, including the reserved
    /// nibble.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw & Self::FULL_MASK {
            0x00 => Self::Type,
            0x01 => Self::Void,
            0x02 => Self::Data,
            0x03 => Self::Struct,
            0x04 => Self::List,
            0x05 => Self::Optional,
            0x06 => Self::Dict,
            0x07 => Self::Callable,
            0x08 => Self::Any,
            0x09 => Self::Tuple,
            0x0a => Self::Resource,
            0x0b => Self::Variant,
            0x0c => Self::Stream,
            0x0d => Self::Null,
            0x0e => Self::Flow,
            0x11 => Self::EmptyList,
            0x21 => Self::EmptyDict,
            0x15 => Self::Tagged,
            0x1e => Self::Block,
            0x12 => Self::Pg,
            0x19 => Self::Multi,
            _ => return None,
        })
    }

    /// Check if this is an extended kind sharing another kind's nibble.
    #[inline]
    pub const fn is_extended(self) -> bool {
        self.raw() > Self::NIBBLE_MASK
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Void => "Void",
            Self::Data => "Data",
            Self::Struct => "Struct",
            Self::List => "List",
            Self::Optional => "Optional",
            Self::Dict => "Dict",
            Self::Callable => "Callable",
            Self::Any => "Any",
            Self::Tuple => "Tuple",
            Self::Resource => "Resource",
            Self::Variant => "Variant",
            Self::Stream => "Stream",
            Self::Null => "Null",
            Self::Flow => "Flow",
            Self::EmptyList => "EmptyList",
            Self::EmptyDict => "EmptyDict",
            Self::Tagged => "Tagged",
            Self::Block => "Block",
            Self::Pg => "Pg",
            Self::Multi => "Multi",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
