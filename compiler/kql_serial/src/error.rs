//! Codec errors.
//!
//! Decoding fails in one of three ways, and callers can tell them apart:
//! the bytes are garbled ([`SerialError::Corrupted`]), the buffer ended
//! early ([`SerialError::PrematureEnd`]), or the environment refused to
//! build a decoded node ([`SerialError::Environment`]). All three are fatal
//! to the whole call; no partial graph is returned.

use kql_ir::{EnvError, Kind};

/// Result alias for codec operations.
pub type SerialResult<T> = Result<T, SerialError>;

/// Decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerialError {
    #[error("corrupted stream at offset {offset}: {kind}")]
    Corrupted { offset: usize, kind: Corruption },

    #[error("premature end of stream at offset {offset}: {needed} more byte(s) needed")]
    PrematureEnd { offset: usize, needed: usize },

    #[error("environment rejected decoded node: {0}")]
    Environment(#[from] EnvError),
}

impl SerialError {
    pub(crate) fn corrupted(offset: usize, kind: Corruption) -> Self {
        Self::Corrupted { offset, kind }
    }

    /// Check if this error reports a truncated buffer.
    pub fn is_premature_end(&self) -> bool {
        matches!(self, Self::PrematureEnd { .. })
    }
}

/// The expectation a corrupted stream violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Corruption {
    #[error("bad begin marker {0:#04x}")]
    BadBeginMarker(u8),

    #[error("unknown header byte {0:#04x}")]
    UnknownCode(u8),

    #[error("literal header uses the Type kind")]
    TypeKindLiteral,

    #[error("expected a type node")]
    NotAType,

    #[error("expected a {expected} type, found {found}")]
    WrongTypeKind { expected: Kind, found: Kind },

    #[error("reference {index} out of range ({len} nodes built)")]
    RefOutOfRange { index: u32, len: usize },

    #[error("name index {index} out of range ({len} names)")]
    NameOutOfRange { index: u32, len: usize },

    #[error("missing end marker, found {0:#04x}")]
    MissingEnd(u8),

    #[error("{count} trailing byte(s) after end marker")]
    TrailingBytes { count: usize },

    #[error("node stack does not match the declared children")]
    StackMismatch,

    #[error("varint overflows its width")]
    VarintOverflow,

    #[error("name is not valid UTF-8")]
    InvalidName,

    #[error("invalid block shape {0}")]
    InvalidBlockShape(u8),

    #[error("scalar value does not fit its type")]
    ScalarOutOfRange,

    #[error("{count} children declared but only {remaining} byte(s) remain")]
    ChildCountExceedsInput { count: u64, remaining: usize },
}
