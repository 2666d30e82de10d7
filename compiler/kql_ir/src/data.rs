//! Scheme types and scalar payloads for `Data` nodes.
//!
//! A [`DataSlot`] names the scheme type of a Data type node. Its numeric id
//! is what travels on the wire. Every slot has a [`Layout`] that fixes the
//! shape of the [`DataValue`] a literal of that slot must carry.

use std::fmt;

/// Scheme type of a `Data` type node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u16)]
pub enum DataSlot {
    Int32 = 0x0001,
    Uint32 = 0x0002,
    Int64 = 0x0003,
    Uint64 = 0x0004,
    Uint8 = 0x0005,
    Bool = 0x0006,
    Int8 = 0x0007,
    Int16 = 0x0008,
    Uint16 = 0x0009,
    Double = 0x0020,
    Float = 0x0021,
    Date = 0x0030,
    Datetime = 0x0031,
    Timestamp = 0x0032,
    Interval = 0x0033,
    TzDate = 0x0034,
    TzDatetime = 0x0035,
    TzTimestamp = 0x0036,
    Date32 = 0x0040,
    Datetime64 = 0x0041,
    Timestamp64 = 0x0042,
    Interval64 = 0x0043,
    TzDate32 = 0x0044,
    TzDatetime64 = 0x0045,
    TzTimestamp64 = 0x0046,
    String = 0x1001,
    Utf8 = 0x1200,
    Json = 0x1201,
    Yson = 0x1202,
    Uuid = 0x1203,
    JsonDocument = 0x1204,
    Decimal = 0x1301,
    DyNumber = 0x1302,
}

/// In-memory shape of a scalar payload.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Layout {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Uuid,
    Bytes,
}

impl DataSlot {
    /// Numeric scheme id.
    #[inline]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Decode a scheme id.
    pub const fn from_id(id: u32) -> Option<Self> {
        Some(match id {
            0x0001 => Self::Int32,
            0x0002 => Self::Uint32,
            0x0003 => Self::Int64,
            0x0004 => Self::Uint64,
            0x0005 => Self::Uint8,
            0x0006 => Self::Bool,
            0x0007 => Self::Int8,
            0x0008 => Self::Int16,
            0x0009 => Self::Uint16,
            0x0020 => Self::Double,
            0x0021 => Self::Float,
            0x0030 => Self::Date,
            0x0031 => Self::Datetime,
            0x0032 => Self::Timestamp,
            0x0033 => Self::Interval,
            0x0034 => Self::TzDate,
            0x0035 => Self::TzDatetime,
            0x0036 => Self::TzTimestamp,
            0x0040 => Self::Date32,
            0x0041 => Self::Datetime64,
            0x0042 => Self::Timestamp64,
            0x0043 => Self::Interval64,
            0x0044 => Self::TzDate32,
            0x0045 => Self::TzDatetime64,
            0x0046 => Self::TzTimestamp64,
            0x1001 => Self::String,
            0x1200 => Self::Utf8,
            0x1201 => Self::Json,
            0x1202 => Self::Yson,
            0x1203 => Self::Uuid,
            0x1204 => Self::JsonDocument,
            0x1301 => Self::Decimal,
            0x1302 => Self::DyNumber,
            _ => return None,
        })
    }

    /// Payload layout for literals of this slot.
    pub const fn layout(self) -> Layout {
        match self {
            Self::Bool => Layout::Bool,
            Self::Int8 => Layout::I8,
            Self::Uint8 => Layout::U8,
            Self::Int16 => Layout::I16,
            Self::Uint16 | Self::Date | Self::TzDate => Layout::U16,
            Self::Int32 | Self::Date32 | Self::TzDate32 => Layout::I32,
            Self::Uint32 | Self::Datetime | Self::TzDatetime => Layout::U32,
            Self::Int64
            | Self::Interval
            | Self::Datetime64
            | Self::Timestamp64
            | Self::Interval64
            | Self::TzDatetime64
            | Self::TzTimestamp64 => Layout::I64,
            Self::Uint64 | Self::Timestamp | Self::TzTimestamp => Layout::U64,
            Self::Float => Layout::F32,
            Self::Double => Layout::F64,
            Self::Decimal => Layout::Decimal,
            Self::Uuid => Layout::Uuid,
            Self::String | Self::Utf8 | Self::Json | Self::Yson | Self::JsonDocument | Self::DyNumber => {
                Layout::Bytes
            }
        }
    }

    /// Whether literals of this slot carry a timezone id.
    pub const fn has_timezone(self) -> bool {
        matches!(
            self,
            Self::TzDate
                | Self::TzDatetime
                | Self::TzTimestamp
                | Self::TzDate32
                | Self::TzDatetime64
                | Self::TzTimestamp64
        )
    }

    /// Whether the bytes payload must be valid UTF-8.
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Utf8 | Self::Json)
    }
}

impl fmt::Display for DataSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Precision and scale of a Decimal type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DecimalParams {
    pub precision: u8,
    pub scale: u8,
}

impl DecimalParams {
    /// Largest supported precision.
    pub const MAX_PRECISION: u8 = 35;

    pub const fn new(precision: u8, scale: u8) -> Self {
        Self { precision, scale }
    }

    /// Precision in `1..=35` and scale not above precision.
    pub const fn is_valid(self) -> bool {
        self.precision >= 1 && self.precision <= Self::MAX_PRECISION && self.scale <= self.precision
    }
}

/// Width of the stored decimal in bits; the top byte of the i128 is implied.
pub const DECIMAL_BITS: u32 = 120;

/// Check that a decimal fits the signed 120-bit range.
#[inline]
pub const fn decimal_in_range(value: i128) -> bool {
    let shift = 128 - DECIMAL_BITS;
    (value << shift) >> shift == value
}

/// Scalar payload of a Data literal.
#[derive(Clone, PartialEq, Debug)]
pub enum DataValue {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(i128),
    Uuid([u8; 16]),
    Bytes(Vec<u8>),
}

impl DataValue {
    /// Layout this value satisfies.
    pub const fn layout(&self) -> Layout {
        match self {
            Self::Bool(_) => Layout::Bool,
            Self::I8(_) => Layout::I8,
            Self::U8(_) => Layout::U8,
            Self::I16(_) => Layout::I16,
            Self::U16(_) => Layout::U16,
            Self::I32(_) => Layout::I32,
            Self::U32(_) => Layout::U32,
            Self::I64(_) => Layout::I64,
            Self::U64(_) => Layout::U64,
            Self::F32(_) => Layout::F32,
            Self::F64(_) => Layout::F64,
            Self::Decimal(_) => Layout::Decimal,
            Self::Uuid(_) => Layout::Uuid,
            Self::Bytes(_) => Layout::Bytes,
        }
    }

    /// Bitwise equality; unlike `==`, NaN payloads compare equal to themselves.
    pub fn same_bits(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Uuid(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::Bytes(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
        }
    }
}
