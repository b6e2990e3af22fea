//! Custom binary codecs
//!
//! Types with a bespoke wire format implement [`BinaryCodec`] and derive
//! `TlvCustom`. The engine then hands them the raw value bytes of their
//! record instead of dispatching on their structure.
//!
//! ```rust
//! use tlv::{BinaryCodec, BoxError, TlvCustom};
//!
//! /// Counter written as ASCII decimal digits
//! #[derive(Debug, Default, PartialEq, TlvCustom)]
//! struct Counter(u32);
//!
//! impl BinaryCodec for Counter {
//!     fn marshal_binary(&self) -> Result<Vec<u8>, BoxError> {
//!         Ok(self.0.to_string().into_bytes())
//!     }
//!
//!     fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), BoxError> {
//!         self.0 = std::str::from_utf8(data)?.parse()?;
//!         Ok(())
//!     }
//! }
//!
//! let bytes = tlv::marshal(&Counter(1100)).unwrap();
//! assert_eq!(bytes, b"1100");
//! ```

use tlv_ber::TlvWriter;
use tlv_core::{BoxError, Tag, TlvError, TlvResult};

/// Binary encode/decode capability supplied by the value itself
pub trait BinaryCodec {
    /// Produce the value bytes of this value
    fn marshal_binary(&self) -> Result<Vec<u8>, BoxError>;

    /// Replace this value with the one encoded in `data`
    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), BoxError>;

    /// Whether the record encoder writes this value
    fn is_present(&self) -> bool {
        true
    }
}

/// Write a custom-codec value under `tag`
///
/// # Errors
/// Returns `TlvError::Delegate` if the codec fails.
pub fn encode_custom<C: BinaryCodec>(
    value: &C,
    tag: Option<Tag>,
    writer: &mut TlvWriter,
) -> TlvResult<()> {
    let binary = value
        .marshal_binary()
        .map_err(|e| TlvError::delegate(std::any::type_name::<C>(), e))?;
    writer.write_tlv(tag, &binary)
}

/// Hand a whole region to a custom codec
///
/// # Errors
/// Returns `TlvError::Delegate` if the codec fails.
pub fn decode_custom<C: BinaryCodec>(value: &mut C, region: &[u8]) -> TlvResult<()> {
    value
        .unmarshal_binary(region)
        .map_err(|e| TlvError::delegate(std::any::type_name::<C>(), e))
}
