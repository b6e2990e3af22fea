//! TLV record reader
//!
//! # Usage Example
//!
//! ```rust
//! use tlv_ber::TlvReader;
//!
//! let data = [0x20, 0x02, 0x7E, 0x44];
//! let mut reader = TlvReader::new(&data);
//! let record = reader.read_record().unwrap();
//! assert_eq!(record.tag.value(), 0x20);
//! assert_eq!(record.value, &[0x7E, 0x44]);
//! assert!(!reader.has_remaining());
//! ```

use crate::length::BerLength;
use tlv_core::{Tag, TlvError, TlvResult};

/// One `(tag, value)` record read from a region
///
/// The value borrows from the region it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Tag of the record
    pub tag: Tag,
    /// Exactly `length` value bytes
    pub value: &'a [u8],
}

/// Cursor reading TLV records from the front of a byte region
///
/// The reader maintains a position that advances as records are read, so
/// consecutive records at one level are read sequentially from the same
/// buffer. A failed read leaves the position where the failing element
/// started being read.
pub struct TlvReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> TlvReader<'a> {
    /// Create a new reader over `buffer`
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Check if there is more data to read
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.buffer[self.position.min(self.buffer.len())..]
    }

    /// Read a 1- or 2-byte tag
    pub fn read_tag(&mut self) -> TlvResult<Tag> {
        let (tag, consumed) = Tag::decode(self.rest())?;
        self.position += consumed;
        Ok(tag)
    }

    /// Read BER length octets
    pub fn read_length(&mut self) -> TlvResult<usize> {
        let (length, consumed) = BerLength::decode(self.rest())?;
        self.position += consumed;
        Ok(length.value())
    }

    /// Read `count` value bytes
    ///
    /// # Errors
    /// Returns `TlvError::Truncated` if fewer than `count` bytes remain.
    pub fn read_value(&mut self, count: usize) -> TlvResult<&'a [u8]> {
        let available = self.remaining();
        if count > available {
            return Err(TlvError::truncated(count, available));
        }
        let start = self.position;
        self.position += count;
        Ok(&self.buffer[start..start + count])
    }

    /// Read one complete TLV record
    ///
    /// # Decoding Process
    /// 1. Decode tag
    /// 2. Decode length
    /// 3. Read exactly `length` value bytes
    pub fn read_record(&mut self) -> TlvResult<RawRecord<'a>> {
        let tag = self.read_tag()?;
        let length = self.read_length()?;
        let value = self.read_value(length)?;
        Ok(RawRecord { tag, value })
    }
}

impl<'a> Iterator for TlvReader<'a> {
    type Item = TlvResult<RawRecord<'a>>;

    /// Yields records until the region is exhausted; after an error the
    /// remaining bytes are dropped so iteration ends.
    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_remaining() {
            return None;
        }
        let record = self.read_record();
        if record.is_err() {
            self.position = self.buffer.len();
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_record_sequence() {
        let data = [0x14, 0x02, b'H', b'i', 0x28, 0x02, 0x00, 0x01];
        let mut reader = TlvReader::new(&data);

        let first = reader.read_record().unwrap();
        assert_eq!(first.tag.value(), 0x14);
        assert_eq!(first.value, b"Hi");
        assert_eq!(reader.position(), 4);

        let second = reader.read_record().unwrap();
        assert_eq!(second.tag.value(), 0x28);
        assert_eq!(second.value, &[0x00, 0x01]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_record_two_byte_tag_long_length() {
        let mut data = vec![0x1F, 0x20, 0x81, 0x80];
        data.extend(std::iter::repeat(0xAB).take(128));
        let mut reader = TlvReader::new(&data);
        let record = reader.read_record().unwrap();
        assert_eq!(record.tag.value(), 0x1F20);
        assert_eq!(record.value.len(), 128);
        assert!(!reader.has_remaining());
    }

    #[test]
    fn test_read_record_truncated_value() {
        let data = [0x20, 0x04, 0x7E, 0x44];
        let mut reader = TlvReader::new(&data);
        assert!(matches!(
            reader.read_record(),
            Err(TlvError::Truncated { needed: 4, available: 2 })
        ));
    }

    #[test]
    fn test_read_record_dangling_tag() {
        let data = [0x20];
        let mut reader = TlvReader::new(&data);
        assert!(matches!(reader.read_record(), Err(TlvError::Truncated { .. })));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let data = [0x01, 0x00, 0x02, 0x80];
        let records: Vec<_> = TlvReader::new(&data).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_ok());
        assert!(matches!(records[1], Err(TlvError::IndefiniteLength)));
    }
}
