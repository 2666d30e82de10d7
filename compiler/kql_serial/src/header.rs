//! Header byte layout.
//!
//! Every node starts with one header byte:
//!
//! ```text
//!   bit 7      bits 4-6        bits 0-3
//! +--------+---------------+-------------+
//! |  TYPE  | USER3..USER1  |  kind nibble |
//! +--------+---------------+-------------+
//! ```
//!
//! For extended kinds the user bits double as part of the 7-bit kind (see
//! [`Kind`]); for the others they are per-kind flags. A low nibble of
//! `0xf` marks a system command instead of a node, and the high nibble then
//! names the command.

use bitflags::bitflags;
use kql_ir::Kind;

/// Selects the kind nibble.
pub const KIND_MASK: u8 = 0x0f;

/// Selects the 7-bit kind (nibble plus extension bits).
pub const TYPE_MASK: u8 = 0x7f;

/// Selects the three per-kind user bits.
pub const USER_MASK: u8 = 0x70;

/// Low nibble value shared by every system command.
pub const SYSTEM_MASK: u8 = 0x0f;

/// Selects the command of a system byte.
pub const COMMAND_MASK: u8 = 0xf0;

/// Low bit of a name descriptor: set for a table reference, clear for an
/// inline name.
pub const NAME_REF_MARK: u32 = 0x01;

bitflags! {
    /// Marker bits of a node header.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Markers: u8 {
        const USER1 = 0x10;
        const USER2 = 0x20;
        const USER3 = 0x40;
        /// Set on Type nodes, clear on literals.
        const TYPE = 0x80;
    }
}

impl Markers {
    /// Optional/Any literal: an item is present.
    pub const HAS_ITEM: Self = Self::USER1;
    /// Optional/Any literal: the item is immediate.
    pub const ITEM_IMMEDIATE: Self = Self::USER2;
    /// Variant literal: the item is immediate.
    pub const VARIANT_ITEM_IMMEDIATE: Self = Self::USER1;
    /// Callable literal: evaluated result instead of inputs.
    pub const HAS_RESULT: Self = Self::USER1;
    /// Callable literal: a non-zero unique id follows the payload.
    pub const HAS_UNIQUE_ID: Self = Self::USER2;
    /// Callable type: merging is disabled.
    pub const MERGE_DISABLED: Self = Self::USER2;
    /// Callable type: a payload node follows the arguments.
    pub const HAS_PAYLOAD: Self = Self::USER3;
}

/// System commands sharing the header byte space.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum SystemCommand {
    Begin = 0x10,
    End = 0x20,
    Ref = 0x30,
    BeginNotImmediate = 0x40,
}

impl SystemCommand {
    /// Full header byte for this command.
    #[inline]
    pub const fn code(self) -> u8 {
        SYSTEM_MASK | self as u8
    }

    /// Begin marker for a root of the given immediacy.
    #[inline]
    pub const fn begin(immediate: bool) -> Self {
        if immediate {
            Self::Begin
        } else {
            Self::BeginNotImmediate
        }
    }
}

/// Header byte of a Type node.
#[inline]
pub const fn type_code(kind: Kind, flags: Markers) -> u8 {
    Markers::TYPE.bits() | kind.raw() | flags.bits()
}

/// Header byte of a literal node.
#[inline]
pub const fn literal_code(kind: Kind, flags: Markers) -> u8 {
    kind.raw() | flags.bits()
}

/// A decoded header byte.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Header {
    /// A system command; carries the command nibble.
    System(u8),
    /// A Type node.
    Type(u8),
    /// A literal node.
    Literal(u8),
}

impl Header {
    pub const fn decode(code: u8) -> Self {
        if code & KIND_MASK == SYSTEM_MASK {
            Self::System(code & COMMAND_MASK)
        } else if code & Markers::TYPE.bits() != 0 {
            Self::Type(code)
        } else {
            Self::Literal(code)
        }
    }
}

/// Base kind named by the low nibble of a node header.
#[inline]
pub const fn nibble_kind(code: u8) -> Option<Kind> {
    Kind::from_raw(code & KIND_MASK)
}

/// Extended kind named by the low 7 bits of a node header.
#[inline]
pub const fn extended_kind(code: u8) -> Option<Kind> {
    Kind::from_raw(code & TYPE_MASK)
}

/// Check a marker bit on a raw header byte.
#[inline]
pub const fn has(code: u8, marker: Markers) -> bool {
    code & marker.bits() != 0
}

// === Immediacy bitmaps ===

/// Bytes needed for a bitmap of `bits` bits.
#[inline]
pub const fn bitmap_len(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Set bit `index`; bit i lives in byte i/8 at position i%8.
#[inline]
pub fn set_bit(bitmap: &mut [u8], index: usize) {
    bitmap[index / 8] |= 1 << (index & 7);
}

#[inline]
pub fn get_bit(bitmap: &[u8], index: usize) -> bool {
    bitmap[index / 8] & (1 << (index & 7)) != 0
}
