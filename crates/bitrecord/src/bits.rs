//! Immutable fixed-length byte buffers with bit-addressed access.
//!
//! Bits are addressed in MSB-first order starting at 1: bit 1 is the high bit of
//! the first byte. See [crate::range::BitRange].

use std::fmt;

use crate::{
    errors::{ReadError, WriteError},
    range::BitRange,
};

/// Length in bytes of an entity record.
pub const RECORD_LEN: usize = 12;

/// A fixed-length record. Every write returns a new buffer; the receiver is never
/// modified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    bytes: Box<[u8]>,
}

impl BitBuffer {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// A buffer of `len` zero bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Byte index and right shift of a 1-indexed bit, or `None` past the end.
    fn locate(&self, pos: usize) -> Option<(usize, u32)> {
        let zero_based = pos.checked_sub(1)?;
        let byte = zero_based / 8;
        if byte >= self.bytes.len() {
            return None;
        }

        Some((byte, 7 - (zero_based % 8) as u32))
    }

    fn read(&self, pos: usize) -> u8 {
        match self.locate(pos) {
            Some((byte, shift)) => (self.bytes[byte] >> shift) & 1,
            None => 0,
        }
    }

    /// Reads `range` MSB-first into an unsigned value.
    ///
    /// Bits outside the buffer read as 0. Ranges wider than 64 bits keep their last
    /// 64 bits.
    pub fn get(&self, range: impl Into<BitRange>) -> u64 {
        let range = range.into();
        match range {
            BitRange::Bit(pos) => self.read(pos) as u64,
            BitRange::Span { start, end } => {
                if range.is_whole_byte() {
                    if let Some(&byte) = self.bytes.get((start - 1) / 8) {
                        return byte as u64;
                    }
                }

                self.get_bitwise(start, end)
            }
        }
    }

    /// Reads `start..=end` one bit at a time, without the whole-byte shortcut.
    pub fn get_bitwise(&self, start: usize, end: usize) -> u64 {
        let mut value = 0u64;
        for pos in start..=end {
            value = (value << 1) | self.read(pos) as u64;
        }

        value
    }

    /// Returns a copy with the low bits of `value` written into `range`, the bit at
    /// `end` taking the lowest bit of `value`.
    ///
    /// Bits outside the buffer are dropped, so a single-bit write past the end returns
    /// an unchanged copy.
    pub fn set(&self, range: impl Into<BitRange>, value: u64) -> BitBuffer {
        let range = range.into();
        match range {
            BitRange::Bit(pos) => self.set_bitwise(pos, pos, value),
            BitRange::Span { start, end } => {
                let index = start.saturating_sub(1) / 8;
                if range.is_whole_byte() && index < self.bytes.len() {
                    let mut bytes = self.bytes.clone();
                    bytes[index] = (value & 0xFF) as u8;
                    return BitBuffer { bytes };
                }

                self.set_bitwise(start, end, value)
            }
        }
    }

    /// Writes `start..=end` one bit at a time, without the whole-byte shortcut.
    pub fn set_bitwise(&self, start: usize, end: usize, mut value: u64) -> BitBuffer {
        let mut bytes = self.bytes.clone();

        for pos in (start..=end).rev() {
            if let Some((byte, shift)) = self.locate(pos) {
                let bit = 1u8 << shift;
                if value & 1 == 1 {
                    bytes[byte] |= bit;
                } else {
                    bytes[byte] &= !bit;
                }
            }

            value >>= 1;
        }

        BitBuffer { bytes }
    }

    fn check_range(&self, range: BitRange) -> Option<(usize, usize)> {
        let (start, end) = range.bounds();
        if start == 0 || end < start || end > self.bit_len() {
            return None;
        }

        Some((start, end))
    }

    /// Like [BitBuffer::get] but rejects ranges that leave the buffer or do not fit a
    /// `u64`.
    pub fn checked_get(&self, range: impl Into<BitRange>) -> Result<u64, ReadError> {
        let range = range.into();
        if range.width() > 64 {
            return Err(ReadError::TooManyBitsRead(range.width()));
        }

        let (start, end) = range.bounds();
        self.check_range(range).ok_or(ReadError::OutOfBounds {
            start,
            end,
            bit_len: self.bit_len(),
        })?;

        Ok(self.get(range))
    }

    /// Like [BitBuffer::set] but rejects ranges that leave the buffer.
    pub fn checked_set(
        &self,
        range: impl Into<BitRange>,
        value: u64,
    ) -> Result<BitBuffer, WriteError> {
        let range = range.into();
        let (start, end) = range.bounds();
        self.check_range(range).ok_or(WriteError::OutOfBounds {
            start,
            end,
            bit_len: self.bit_len(),
        })?;

        Ok(self.set(range, value))
    }

    /// Single bit as a bool.
    pub fn bit(&self, pos: usize) -> bool {
        self.read(pos) == 1
    }

    pub fn with_bit(&self, pos: usize, on: bool) -> BitBuffer {
        self.set(BitRange::Bit(pos), on as u64)
    }
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::zeroed(RECORD_LEN)
    }
}

impl From<[u8; RECORD_LEN]> for BitBuffer {
    fn from(bytes: [u8; RECORD_LEN]) -> Self {
        Self::from_bytes(&bytes)
    }
}

impl From<Vec<u8>> for BitBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for BitBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Canonical raw form, e.g. `0102 0304 ...`.
impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::raw::format(self))
    }
}
