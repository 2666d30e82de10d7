//! Interned name handle.
//!
//! Struct member names, callable names, resource tags and tagged-type tags
//! are all stored once in the [`StringInterner`](crate::StringInterner) and
//! referenced by a 32-bit [`Name`].

use std::fmt;

/// Interned string identifier.
///
/// Two names compare equal exactly when their strings are equal, as long as
/// both came from the same interner.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's string table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

const _: () = assert!(std::mem::size_of::<Name>() == 4);
