//! Scalar payloads of Data literals.
//!
//! The encoding follows the payload layout of the scheme type:
//!
//! | Layout            | Bytes                                   |
//! |-------------------|-----------------------------------------|
//! | bool, u8, i8      | 1 raw byte                              |
//! | u16, u32          | var32                                   |
//! | i16, i32          | zigzag + var32                          |
//! | u64               | var64                                   |
//! | i64               | zigzag + var64                          |
//! | f32, f64          | 4 / 8 bytes, little endian              |
//! | decimal           | low 15 bytes of the i128, little endian |
//! | uuid              | 16 raw bytes                            |
//! | bytes             | var32 length + raw bytes                |
//!
//! Timezone-aware types append the timezone id as var32.

use kql_ir::{DataSlot, DataValue, Layout};

use crate::cursor::Cursor;
use crate::error::{Corruption, SerialError, SerialResult};
use crate::varint::{
    write_var32, write_var64, zigzag_decode32, zigzag_decode64, zigzag_encode32, zigzag_encode64,
};

/// Bytes written for a decimal; the top byte is implied by sign extension.
pub const DECIMAL_WIRE_BYTES: usize = 15;

/// Append the payload of a Data literal.
pub(crate) fn write_scalar(out: &mut Vec<u8>, value: &DataValue, tz: Option<u16>) {
    match value {
        DataValue::Bool(v) => out.push(u8::from(*v)),
        DataValue::U8(v) => out.push(*v),
        DataValue::I8(v) => out.push(v.to_le_bytes()[0]),
        DataValue::I16(v) => write_var32(out, zigzag_encode32(i32::from(*v))),
        DataValue::U16(v) => write_var32(out, u32::from(*v)),
        DataValue::I32(v) => write_var32(out, zigzag_encode32(*v)),
        DataValue::U32(v) => write_var32(out, *v),
        DataValue::I64(v) => write_var64(out, zigzag_encode64(*v)),
        DataValue::U64(v) => write_var64(out, *v),
        DataValue::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
        DataValue::F64(v) => out.extend_from_slice(&v.to_le_bytes()),
        DataValue::Decimal(v) => out.extend_from_slice(&v.to_le_bytes()[..DECIMAL_WIRE_BYTES]),
        DataValue::Uuid(bytes) => out.extend_from_slice(bytes),
        DataValue::Bytes(bytes) => {
            write_var32(out, wire_len(bytes.len()));
            out.extend_from_slice(bytes);
        }
    }
    if let Some(tz) = tz {
        write_var32(out, u32::from(tz));
    }
}

/// Read the payload of a Data literal of the given slot.
///
/// Returns the value and, for timezone-aware slots, the raw timezone id;
/// the environment validates the id.
pub(crate) fn read_scalar(
    cursor: &mut Cursor<'_>,
    slot: DataSlot,
) -> SerialResult<(DataValue, Option<u32>)> {
    let at = cursor.pos();
    let out_of_range = || SerialError::corrupted(at, Corruption::ScalarOutOfRange);

    let value = match slot.layout() {
        Layout::Bool => DataValue::Bool(cursor.read_u8()? != 0),
        Layout::U8 => DataValue::U8(cursor.read_u8()?),
        Layout::I8 => DataValue::I8(i8::from_le_bytes([cursor.read_u8()?])),
        Layout::I16 => {
            let v = zigzag_decode32(cursor.read_var32()?);
            DataValue::I16(i16::try_from(v).map_err(|_| out_of_range())?)
        }
        Layout::U16 => DataValue::U16(u16::try_from(cursor.read_var32()?).map_err(|_| out_of_range())?),
        Layout::I32 => DataValue::I32(zigzag_decode32(cursor.read_var32()?)),
        Layout::U32 => DataValue::U32(cursor.read_var32()?),
        Layout::I64 => DataValue::I64(zigzag_decode64(cursor.read_var64()?)),
        Layout::U64 => DataValue::U64(cursor.read_var64()?),
        Layout::F32 => DataValue::F32(f32::from_le_bytes(cursor.read_array()?)),
        Layout::F64 => DataValue::F64(f64::from_le_bytes(cursor.read_array()?)),
        Layout::Decimal => DataValue::Decimal(decode_decimal(cursor.read_array()?)),
        Layout::Uuid => DataValue::Uuid(cursor.read_array()?),
        Layout::Bytes => {
            let len = cursor.read_var32()? as usize;
            DataValue::Bytes(cursor.read_bytes(len)?.to_vec())
        }
    };

    let tz = if slot.has_timezone() {
        Some(cursor.read_var32()?)
    } else {
        None
    };
    Ok((value, tz))
}

/// Rebuild an i128 from its low 15 bytes, sign-extending from bit 119.
pub(crate) fn decode_decimal(low: [u8; DECIMAL_WIRE_BYTES]) -> i128 {
    let mut full = [0u8; 16];
    full[..DECIMAL_WIRE_BYTES].copy_from_slice(&low);
    if low[DECIMAL_WIRE_BYTES - 1] & 0x80 != 0 {
        full[DECIMAL_WIRE_BYTES] = 0xff;
    }
    i128::from_le_bytes(full)
}

/// Length prefix for an in-memory length; lengths past `u32::MAX` cannot
/// be represented and are a caller bug.
pub(crate) fn wire_len(len: usize) -> u32 {
    debug_assert!(u32::try_from(len).is_ok(), "length {len} exceeds u32");
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;
