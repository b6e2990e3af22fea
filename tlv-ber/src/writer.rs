//! TLV envelope writer
//!
//! # Usage Example
//!
//! ```rust
//! use tlv_ber::TlvWriter;
//! use tlv_core::Tag;
//!
//! let mut writer = TlvWriter::new();
//! writer.write_tlv(Some(Tag::from_hex("20").unwrap()), &[0x7E, 0x44]).unwrap();
//! assert_eq!(writer.into_bytes(), vec![0x20, 0x02, 0x7E, 0x44]);
//! ```

use crate::length::BerLength;
use bytes::BufMut;
use tlv_core::{Tag, TlvResult};

/// Writer accumulating TLV records into an in-memory buffer
///
/// Writes into the buffer cannot fail; the only error path is a payload too
/// large for four length octets.
///
/// An absent tag (`None`) marks the top level of a `marshal` call: the value
/// is written bare, without tag or length.
pub struct TlvWriter {
    buffer: Vec<u8>,
}

impl TlvWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Write a TLV (Tag-Length-Value) triplet
    ///
    /// # Arguments
    /// * `tag` - Tag to write, or `None` to write `value` bare
    /// * `value` - Value bytes (already encoded)
    pub fn write_tlv(&mut self, tag: Option<Tag>, value: &[u8]) -> TlvResult<()> {
        if let Some(tag) = tag {
            let length = BerLength::for_payload(value.len())?;
            tag.encode_into(&mut self.buffer);
            length.encode_into(&mut self.buffer);
        }
        self.buffer.put_slice(value);
        Ok(())
    }

    /// Write a constructed value
    ///
    /// `body` writes the nested records. With a tag they are collected in a
    /// child buffer and wrapped as `tag || length || body`; without one they
    /// are written straight into this writer.
    pub fn write_nested<F>(&mut self, tag: Option<Tag>, body: F) -> TlvResult<()>
    where
        F: FnOnce(&mut TlvWriter) -> TlvResult<()>,
    {
        match tag {
            None => body(self),
            Some(tag) => {
                let mut child = TlvWriter::new();
                body(&mut child)?;
                self.write_tlv(Some(tag), child.as_bytes())
            }
        }
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for TlvWriter {
    fn default() -> Self {
        Self::new()
    }
}
