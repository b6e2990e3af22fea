//! tlv - schema-driven BER-style TLV encoding and decoding
//!
//! Structured Rust values are written as nested Tag-Length-Value records and
//! read back again. Each record field carries a tag; the wire format follows
//! BER conventions for tags (1 or 2 bytes) and lengths (short and long form),
//! without the indefinite-length form.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `tlv-core`: Tags, error type and result alias
//! - `tlv-ber`: Length octets, record reader/writer, fragment indexing
//! - `tlv-derive`: `#[derive(Tlv)]` and `#[derive(TlvCustom)]`
//! - `tlv`: Schema model, value mapping and the encode/decode engine
//!
//! # Usage
//!
//! ```rust
//! use tlv::Tlv;
//!
//! #[derive(Debug, Default, PartialEq, Tlv)]
//! struct Reading {
//!     #[tlv("20")]
//!     value: i16,
//! }
//!
//! let bytes = tlv::marshal(&Reading { value: 32324 }).unwrap();
//! assert_eq!(bytes, vec![0x20, 0x02, 0x7E, 0x44]);
//!
//! let decoded: Reading = tlv::from_bytes(&bytes).unwrap();
//! assert_eq!(decoded.value, 32324);
//! ```
//!
//! # Features
//!
//! - `derive` (default): re-exports the derive macros

extern crate self as tlv;

pub mod custom;
pub mod record;
pub mod schema;
pub mod value;

// Re-export core types
pub use tlv_core::{BoxError, Tag, TlvError, TlvResult};

// Re-export low-level codec
pub use tlv_ber::{BerLength, FragmentMap, RawRecord, TlvReader, TlvWriter};

pub use custom::BinaryCodec;
pub use record::TlvRecord;
pub use schema::{FieldSchema, IntKind, RecordRef, RecordSchema, RecordSchemaBuilder, Shape};
pub use value::TlvValue;

#[cfg(feature = "derive")]
pub use tlv_derive::{Tlv, TlvCustom};

/// Reject values that cannot stand at the top level and surface schema errors
fn check_top_level<T: TlvValue>() -> TlvResult<()> {
    let shape = T::shape();
    if !shape.is_top_level() {
        return Err(TlvError::Usage(format!(
            "top-level value must be a record or custom-codec value, got {} ({})",
            shape.describe(),
            std::any::type_name::<T>()
        )));
    }
    shape.resolve_all()
}

/// Encode a record or custom-codec value
///
/// The output is the concatenation of the value's field records; the
/// top-level value itself gets no tag or length.
///
/// # Errors
/// - `TlvError::Usage` if `T` is not a record or custom-codec value
/// - `TlvError::Schema`/`TlvError::UnsupportedShape` if a reachable record
///   schema is invalid
/// - `TlvError::Delegate` if a custom codec fails
pub fn marshal<T: TlvValue>(value: &T) -> TlvResult<Vec<u8>> {
    check_top_level::<T>()?;
    let mut writer = TlvWriter::new();
    value.encode_into(None, &mut writer)?;
    let bytes = writer.into_bytes();
    log::trace!(
        "marshalled {} into {} bytes",
        std::any::type_name::<T>(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decode `data` into an existing value
///
/// Fields whose tag does not occur in `data` keep their current contents.
/// On error `value` may already hold some decoded fields; use [`from_bytes`]
/// to avoid observing partial state.
///
/// # Errors
/// - `TlvError::Usage` if `T` is not a record or custom-codec value
/// - Any malformed-input error: `Truncated`, `IndefiniteLength`,
///   `UnsupportedLengthForm`, `InvalidText`
/// - `TlvError::Delegate` if a custom codec fails
pub fn unmarshal<T: TlvValue>(data: &[u8], value: &mut T) -> TlvResult<()> {
    check_top_level::<T>()?;
    log::trace!(
        "unmarshalling {} bytes into {}",
        data.len(),
        std::any::type_name::<T>()
    );
    value.decode_from(data)
}

/// Decode `data` into a fresh value
///
/// # Errors
/// Same as [`unmarshal`].
pub fn from_bytes<T: TlvValue + Default>(data: &[u8]) -> TlvResult<T> {
    let mut value = T::default();
    unmarshal(data, &mut value)?;
    Ok(value)
}
