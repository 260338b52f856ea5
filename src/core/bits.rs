//! Bit-level record codec
//!
//! An item's persisted state is a packed bit sequence, not a byte-aligned struct.
//! Bit `i` of a record lives in `bytes[i / 8]` at bit position `i % 8`
//! (least significant bit first), which is the order used on disk by both save
//! format variants. Multi-bit fields are stored least significant bit first.
//!
//! Every operation returns a new [`BitRecord`]; records are never spliced in place.

use crate::error::{Result, StashError};
use serde::{Deserialize, Serialize};

/// Widest field the codec reads or writes in one call
pub const MAX_FIELD_WIDTH: u32 = 64;

/// Immutable packed bit sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitRecord {
    bytes: Vec<u8>,
    bit_len: u32,
}

impl BitRecord {
    /// Record of `bit_len` zero bits
    pub fn zeroed(bit_len: u32) -> Self {
        BitRecord {
            bytes: vec![0; byte_len(bit_len)],
            bit_len,
        }
    }

    /// Wrap raw bytes; every bit of every byte is significant
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let bit_len = (bytes.len() * 8) as u32;
        BitRecord { bytes, bit_len }
    }

    /// Wrap raw bytes whose last byte is only partially used
    ///
    /// Bits beyond `bit_len` are cleared so that equality and serialization only
    /// ever see the significant prefix.
    pub fn with_bit_len(mut bytes: Vec<u8>, bit_len: u32) -> Result<Self> {
        let needed = byte_len(bit_len);
        if bytes.len() < needed {
            return Err(StashError::FieldOutOfRange {
                offset: 0,
                width: bit_len,
                len: (bytes.len() * 8) as u32,
            });
        }
        bytes.truncate(needed);
        let tail = bit_len % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }
        Ok(BitRecord { bytes, bit_len })
    }

    pub fn bit_len(&self) -> u32 {
        self.bit_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Serialize to bytes, zero padded up to the next byte boundary
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Read `width` bits starting at `offset`
    pub fn read_field(&self, offset: u32, width: u32) -> Result<u64> {
        self.check_range(offset, width)?;
        let mut value = 0u64;
        for i in 0..width {
            if self.bit(offset + i) {
                value |= 1u64 << i;
            }
        }
        Ok(value)
    }

    /// Produce a copy with `width` bits at `offset` replaced by `value`
    ///
    /// Fails with `FieldOverflow` if `value` needs more than `width` bits.
    pub fn write_field(&self, offset: u32, width: u32, value: u64) -> Result<BitRecord> {
        self.check_range(offset, width)?;
        check_fits("raw", width, value)?;

        let mut next = self.clone();
        for i in 0..width {
            next.set_bit(offset + i, (value >> i) & 1 == 1);
        }
        Ok(next)
    }

    /// Produce a copy with the bit range `[offset, offset + width)` cut out
    pub fn remove_bits(&self, offset: u32, width: u32) -> Result<BitRecord> {
        self.check_range(offset, width)?;

        let mut out = BitSink::with_capacity(self.bit_len - width);
        for i in 0..offset {
            out.push(self.bit(i));
        }
        for i in offset + width..self.bit_len {
            out.push(self.bit(i));
        }
        Ok(out.finish())
    }

    /// Produce a copy with a new `width`-bit field holding `value` inserted at `offset`
    pub fn insert_field(&self, offset: u32, width: u32, value: u64) -> Result<BitRecord> {
        self.check_range(offset, 0)?;
        if width > MAX_FIELD_WIDTH {
            return Err(StashError::FieldOutOfRange {
                offset,
                width,
                len: self.bit_len,
            });
        }
        check_fits("raw", width, value)?;

        let mut out = BitSink::with_capacity(self.bit_len + width);
        for i in 0..offset {
            out.push(self.bit(i));
        }
        for i in 0..width {
            out.push((value >> i) & 1 == 1);
        }
        for i in offset..self.bit_len {
            out.push(self.bit(i));
        }
        Ok(out.finish())
    }

    /// Replace an `old_width` field at `offset` with a `new_width` field holding `value`
    ///
    /// The record grows or shrinks by the width difference; bits after the field
    /// move with it.
    pub fn resize_field(
        &self,
        offset: u32,
        old_width: u32,
        new_width: u32,
        value: u64,
    ) -> Result<BitRecord> {
        check_fits("raw", new_width, value)?;
        self.remove_bits(offset, old_width)?
            .insert_field(offset, new_width, value)
    }

    fn check_range(&self, offset: u32, width: u32) -> Result<()> {
        let end = offset.checked_add(width);
        if width > MAX_FIELD_WIDTH || end.map_or(true, |end| end > self.bit_len) {
            return Err(StashError::FieldOutOfRange {
                offset,
                width,
                len: self.bit_len,
            });
        }
        Ok(())
    }

    fn bit(&self, index: u32) -> bool {
        (self.bytes[(index / 8) as usize] >> (index % 8)) & 1 == 1
    }

    fn set_bit(&mut self, index: u32, on: bool) {
        let byte = &mut self.bytes[(index / 8) as usize];
        let mask = 1u8 << (index % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

/// Check that `value` is representable in `width` bits
pub(crate) fn check_fits(field: &'static str, width: u32, value: u64) -> Result<()> {
    let fits = width >= MAX_FIELD_WIDTH || value >> width == 0;
    if !fits {
        return Err(StashError::FieldOverflow {
            field,
            value,
            width,
        });
    }
    Ok(())
}

fn byte_len(bit_len: u32) -> usize {
    bit_len.div_ceil(8) as usize
}

/// Append-only bit buffer used to assemble reshaped records
struct BitSink {
    bytes: Vec<u8>,
    bit_len: u32,
}

impl BitSink {
    fn with_capacity(bits: u32) -> Self {
        BitSink {
            bytes: Vec::with_capacity(byte_len(bits)),
            bit_len: 0,
        }
    }

    fn push(&mut self, on: bool) {
        if self.bit_len % 8 == 0 {
            self.bytes.push(0);
        }
        if on {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << (self.bit_len % 8);
            }
        }
        self.bit_len += 1;
    }

    fn finish(self) -> BitRecord {
        BitRecord {
            bytes: self.bytes,
            bit_len: self.bit_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lsb_first() {
        // 0b1011_0100: bits 2, 4, 5, 7 set
        let record = BitRecord::from_bytes(vec![0b1011_0100, 0xFF]);
        assert_eq!(record.read_field(0, 2).unwrap(), 0);
        assert_eq!(record.read_field(2, 3).unwrap(), 0b101);
        assert_eq!(record.read_field(4, 4).unwrap(), 0b1011);
        assert_eq!(record.read_field(6, 4).unwrap(), 0b1110);
    }

    #[test]
    fn test_write_does_not_touch_neighbours() {
        let record = BitRecord::from_bytes(vec![0xFF, 0xFF, 0xFF]);
        let written = record.write_field(5, 9, 0).unwrap();

        assert_eq!(written.bit_len(), record.bit_len());
        assert_eq!(written.read_field(0, 5).unwrap(), 0b11111);
        assert_eq!(written.read_field(5, 9).unwrap(), 0);
        assert_eq!(written.read_field(14, 10).unwrap(), 0x3FF);
        // Source record is untouched
        assert_eq!(record.read_field(5, 9).unwrap(), 0x1FF);
    }

    #[test]
    fn test_write_overflow() {
        let record = BitRecord::zeroed(32);
        let result = record.write_field(0, 3, 8);
        assert!(matches!(
            result,
            Err(StashError::FieldOverflow { value: 8, width: 3, .. })
        ));
        assert!(record.write_field(0, 3, 7).is_ok());
    }

    #[test]
    fn test_out_of_range() {
        let record = BitRecord::zeroed(20);
        assert!(matches!(
            record.read_field(15, 6),
            Err(StashError::FieldOutOfRange { .. })
        ));
        assert!(record.read_field(15, 5).is_ok());
        assert!(record.read_field(u32::MAX, 2).is_err());
    }

    #[test]
    fn test_full_width_field() {
        let record = BitRecord::zeroed(70);
        let written = record.write_field(3, 64, u64::MAX).unwrap();
        assert_eq!(written.read_field(3, 64).unwrap(), u64::MAX);
        assert_eq!(written.read_field(0, 3).unwrap(), 0);
        assert_eq!(written.read_field(67, 3).unwrap(), 0);
    }

    #[test]
    fn test_with_bit_len_clears_tail() {
        let record = BitRecord::with_bit_len(vec![0xFF, 0xFF], 12).unwrap();
        assert_eq!(record.bit_len(), 12);
        assert_eq!(record.as_bytes(), &[0xFF, 0x0F]);
        assert!(BitRecord::with_bit_len(vec![0xFF], 12).is_err());
    }

    #[test]
    fn test_remove_bits() {
        let record = BitRecord::zeroed(24)
            .write_field(0, 4, 0b1010)
            .unwrap()
            .write_field(4, 8, 0xFF)
            .unwrap()
            .write_field(12, 12, 0xABC)
            .unwrap();

        let cut = record.remove_bits(4, 8).unwrap();
        assert_eq!(cut.bit_len(), 16);
        assert_eq!(cut.read_field(0, 4).unwrap(), 0b1010);
        assert_eq!(cut.read_field(4, 12).unwrap(), 0xABC);
    }

    #[test]
    fn test_insert_field() {
        let record = BitRecord::zeroed(10).write_field(0, 10, 0x3FF).unwrap();
        let grown = record.insert_field(5, 3, 0b010).unwrap();

        assert_eq!(grown.bit_len(), 13);
        assert_eq!(grown.read_field(0, 5).unwrap(), 0x1F);
        assert_eq!(grown.read_field(5, 3).unwrap(), 0b010);
        assert_eq!(grown.read_field(8, 5).unwrap(), 0x1F);
    }

    #[test]
    fn test_insert_at_end() {
        let record = BitRecord::zeroed(8);
        let grown = record.insert_field(8, 4, 0xF).unwrap();
        assert_eq!(grown.bit_len(), 12);
        assert_eq!(grown.read_field(8, 4).unwrap(), 0xF);
        assert!(record.insert_field(9, 1, 1).is_err());
    }

    #[test]
    fn test_resize_field() {
        let record = BitRecord::zeroed(30)
            .write_field(10, 10, 101)
            .unwrap()
            .write_field(20, 10, 0x155)
            .unwrap();

        let narrowed = record.resize_field(10, 10, 3, 5).unwrap();
        assert_eq!(narrowed.bit_len(), 23);
        assert_eq!(narrowed.read_field(10, 3).unwrap(), 5);
        assert_eq!(narrowed.read_field(13, 10).unwrap(), 0x155);

        let widened = narrowed.resize_field(10, 3, 10, 101).unwrap();
        assert_eq!(widened, record);
    }
}
