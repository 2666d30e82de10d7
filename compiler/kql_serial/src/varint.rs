//! Variable-length integers (LEB128) and zigzag mapping.
//!
//! Each byte carries 7 bits of payload, least significant group first; the
//! high bit says another byte follows. A 32-bit value takes at most 5
//! bytes and a 64-bit value at most 10. Signed values are zigzag-mapped
//! first so small magnitudes of either sign stay short.

/// Maximum encoded size of a 32-bit varint.
pub const MAX_VAR32_BYTES: usize = 5;

/// Maximum encoded size of a 64-bit varint.
pub const MAX_VAR64_BYTES: usize = 10;

/// Why a varint could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// The buffer ended while the continuation bit was set.
    Truncated,
    /// More groups than the width allows, or bits past the width.
    Overflow,
}

/// Append a 64-bit varint.
#[allow(clippy::cast_possible_truncation)] // masked to 7 bits
pub fn write_var64(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Append a 32-bit varint.
#[inline]
pub fn write_var32(out: &mut Vec<u8>, value: u32) {
    write_var64(out, u64::from(value));
}

/// Decode a 64-bit varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_var64(buf: &[u8]) -> Result<(u64, usize), VarintError> {
    decode(buf, MAX_VAR64_BYTES, 64)
}

/// Decode a 32-bit varint from the front of `buf`.
pub fn read_var32(buf: &[u8]) -> Result<(u32, usize), VarintError> {
    let (value, len) = decode(buf, MAX_VAR32_BYTES, 32)?;
    let value = u32::try_from(value).map_err(|_| VarintError::Overflow)?;
    Ok((value, len))
}

fn decode(buf: &[u8], max_bytes: usize, width: u32) -> Result<(u64, usize), VarintError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= max_bytes {
            return Err(VarintError::Overflow);
        }

        let group = u64::from(byte & 0x7f);
        // Bits of the last group that land past the width must be zero.
        let room = width - shift;
        if room < 7 && group >> room != 0 {
            return Err(VarintError::Overflow);
        }
        result |= group << shift;

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
        shift += 7;
    }

    if buf.len() >= max_bytes {
        Err(VarintError::Overflow)
    } else {
        Err(VarintError::Truncated)
    }
}

/// Map a signed 32-bit value onto an unsigned one.
#[inline]
#[allow(clippy::cast_sign_loss)] // bit reinterpretation
pub const fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode32`].
#[inline]
#[allow(clippy::cast_possible_wrap)] // top bit is clear after the shift
pub const fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Map a signed 64-bit value onto an unsigned one.
#[inline]
#[allow(clippy::cast_sign_loss)] // bit reinterpretation
pub const fn zigzag_encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode64`].
#[inline]
#[allow(clippy::cast_possible_wrap)] // top bit is clear after the shift
pub const fn zigzag_decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests;
