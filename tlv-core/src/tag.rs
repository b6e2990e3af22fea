//! TLV tag identifier

use crate::error::{TlvError, TlvResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Low five bits of a leading tag byte that announce a second tag byte
const CONTINUATION_MARK: u8 = 0x1F;

/// Tag identifying a field within one structural level
///
/// A tag is one or two bytes on the wire. A leading byte whose low five bits
/// are all set (`byte & 0x1F == 0x1F`) is followed by exactly one more byte;
/// any other leading byte is a complete single-byte tag.
///
/// The same rule is enforced when a tag is built from an annotation and when
/// it is read from the wire, so every tag written by the encoder is read back
/// unchanged by the decoder:
/// - values `0x00..=0xFF` must not carry the continuation mark (`0x1F`, `0x3F`,
///   ... are rejected)
/// - values above `0xFF` must carry it in their high byte (`0x1F20`, `0x5F01`)
///
/// Tags are level-local: the same tag may appear at different nesting levels
/// with unrelated meanings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    value: u16,
}

impl Tag {
    /// Create a tag from its numeric value
    ///
    /// # Errors
    ///
    /// Returns `TlvError::Schema` if the value violates the one/two byte rule.
    pub fn new(value: u16) -> TlvResult<Self> {
        let [high, low] = value.to_be_bytes();
        if high == 0 {
            if low & CONTINUATION_MARK == CONTINUATION_MARK {
                return Err(TlvError::Schema(format!(
                    "tag {:02X} announces a second byte but has none",
                    low
                )));
            }
        } else if high & CONTINUATION_MARK != CONTINUATION_MARK {
            return Err(TlvError::Schema(format!(
                "two-byte tag {:04X} must start with a byte whose low 5 bits are set",
                value
            )));
        }
        Ok(Self { value })
    }

    /// Parse a tag annotation written as 2 or 4 hexadecimal digits
    ///
    /// Supports annotations like `"1E"`, `"7b"` or `"1F20"`.
    ///
    /// # Errors
    ///
    /// Returns `TlvError::Schema` if the annotation is empty, is not hex, has
    /// the wrong number of digits, or violates the one/two byte rule.
    pub fn from_hex(s: &str) -> TlvResult<Self> {
        if s.is_empty() {
            return Err(TlvError::Schema("missing tag annotation".to_string()));
        }
        if !(s.len() == 2 || s.len() == 4) || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TlvError::Schema(format!(
                "invalid tag \"{}\", need 2 or 4 hex digits",
                s
            )));
        }
        let value = u16::from_str_radix(s, 16)
            .map_err(|e| TlvError::Schema(format!("invalid tag \"{}\": {}", s, e)))?;
        Self::new(value)
    }

    /// Decode a tag from the front of `data`
    ///
    /// # Returns
    ///
    /// Returns `Ok((Tag, bytes_consumed))` where `bytes_consumed` is 1 or 2.
    ///
    /// # Errors
    ///
    /// Returns `TlvError::Truncated` if `data` is empty or a continuation byte
    /// is missing.
    pub fn decode(data: &[u8]) -> TlvResult<(Self, usize)> {
        let first = *data.first().ok_or(TlvError::truncated(1, 0))?;
        if first & CONTINUATION_MARK != CONTINUATION_MARK {
            return Ok((Self { value: first as u16 }, 1));
        }

        let second = *data.get(1).ok_or(TlvError::truncated(2, data.len()))?;
        Ok((
            Self {
                value: u16::from_be_bytes([first, second]),
            },
            2,
        ))
    }

    /// Append the wire bytes of this tag to `out`
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        if self.is_two_byte() {
            out.extend_from_slice(&self.value.to_be_bytes());
        } else {
            out.push(self.value as u8);
        }
    }

    /// Encode tag to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2);
        self.encode_into(&mut out);
        out
    }

    /// Get the numeric tag value
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Whether this tag occupies two bytes on the wire
    pub fn is_two_byte(&self) -> bool {
        self.value > 0xFF
    }

    /// Number of bytes this tag occupies on the wire
    pub fn encoded_len(&self) -> usize {
        if self.is_two_byte() { 2 } else { 1 }
    }
}

impl FromStr for Tag {
    type Err = TlvError;

    fn from_str(s: &str) -> TlvResult<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_two_byte() {
            write!(f, "{:04X}", self.value)
        } else {
            write!(f, "{:02X}", self.value)
        }
    }
}
