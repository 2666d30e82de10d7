//! Bounds-checked reading over the input buffer.
//!
//! The cursor can be moved backwards: the reader rewinds to a node's start
//! on every pass and jumps to the end of a built child when it pops one.

use crate::error::{Corruption, SerialError, SerialResult};
use crate::varint::{self, VarintError};

pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn set_pos(&mut self, pos: usize) {
        debug_assert!(pos <= self.buf.len());
        self.pos = pos;
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub(crate) fn read_u8(&mut self) -> SerialResult<u8> {
        let byte = *self.buf.get(self.pos).ok_or(SerialError::PrematureEnd {
            offset: self.pos,
            needed: 1,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> SerialResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(SerialError::PrematureEnd {
                offset: self.pos,
                needed: count - self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> SerialResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(crate) fn read_var32(&mut self) -> SerialResult<u32> {
        let (value, len) = varint::read_var32(&self.buf[self.pos..]).map_err(|e| self.varint_error(e))?;
        self.pos += len;
        Ok(value)
    }

    pub(crate) fn read_var64(&mut self) -> SerialResult<u64> {
        let (value, len) = varint::read_var64(&self.buf[self.pos..]).map_err(|e| self.varint_error(e))?;
        self.pos += len;
        Ok(value)
    }

    /// Read a var32 that declares how many items follow, rejecting counts
    /// the rest of the buffer cannot possibly hold.
    pub(crate) fn read_count(&mut self, bytes_per_item: usize) -> SerialResult<u32> {
        let at = self.pos;
        let count = self.read_var32()?;
        let needed = (count as usize).saturating_mul(bytes_per_item);
        if needed > self.remaining() {
            return Err(SerialError::corrupted(
                at,
                Corruption::ChildCountExceedsInput {
                    count: u64::from(count),
                    remaining: self.remaining(),
                },
            ));
        }
        Ok(count)
    }

    fn varint_error(&self, err: VarintError) -> SerialError {
        match err {
            VarintError::Truncated => SerialError::PrematureEnd {
                offset: self.buf.len(),
                needed: 1,
            },
            VarintError::Overflow => SerialError::corrupted(self.pos, Corruption::VarintOverflow),
        }
    }
}
