//! Structured values (records) and the record encode/decode engine
//!
//! A record is a struct whose fields each carry a tag. Encoding walks the
//! fields in schema order and writes every present field as its own TLV;
//! the concatenation is then wrapped in the record's own tag, unless the
//! record is the top-level value. Decoding indexes one region into fragments
//! and hands each fragment to the field declared under its tag.
//!
//! `#[derive(Tlv)]` implements [`TlvRecord`] and [`TlvValue`] for a struct.
//! A hand-written implementation looks like this:
//!
//! ```rust
//! use std::sync::OnceLock;
//! use tlv::{record, RecordRef, RecordSchema, Shape, Tag, TlvRecord, TlvResult, TlvValue, TlvWriter};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Reading {
//!     value: i16,
//! }
//!
//! impl TlvRecord for Reading {
//!     fn schema() -> TlvResult<&'static RecordSchema> {
//!         static SCHEMA: OnceLock<TlvResult<RecordSchema>> = OnceLock::new();
//!         SCHEMA
//!             .get_or_init(|| {
//!                 RecordSchema::builder("Reading")
//!                     .field("value", "20", <i16 as TlvValue>::shape())
//!                     .build()
//!             })
//!             .as_ref()
//!             .map_err(Clone::clone)
//!     }
//!
//!     fn encode_fields(&self, schema: &RecordSchema, writer: &mut TlvWriter) -> TlvResult<()> {
//!         record::encode_field(&self.value, schema.field(0)?, writer)
//!     }
//!
//!     fn decode_field(&mut self, index: usize, fragment: &[u8]) -> TlvResult<()> {
//!         match index {
//!             0 => self.value.decode_from(fragment),
//!             _ => Err(record::unknown_field::<Self>(index)),
//!         }
//!     }
//! }
//!
//! impl TlvValue for Reading {
//!     fn shape() -> Shape {
//!         Shape::Record(RecordRef::of::<Self>())
//!     }
//!     fn is_present(&self) -> bool {
//!         self.value.is_present()
//!     }
//!     fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()> {
//!         record::encode_record(self, tag, writer)
//!     }
//!     fn decode_from(&mut self, region: &[u8]) -> TlvResult<()> {
//!         record::decode_record(self, region)
//!     }
//! }
//!
//! let bytes = tlv::marshal(&Reading { value: 32324 }).unwrap();
//! assert_eq!(bytes, vec![0x20, 0x02, 0x7E, 0x44]);
//! ```

use crate::schema::{FieldSchema, RecordRef, RecordSchema};
use crate::value::TlvValue;
use std::cell::Cell;
use tlv_ber::{FragmentMap, TlvWriter};
use tlv_core::{Tag, TlvError, TlvResult};

/// Deepest record nesting accepted by [`decode_record`]
///
/// The top-level record counts as depth 1.
pub const MAX_DEPTH: usize = 128;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// One level of record nesting on the current thread, released on drop
struct DepthGuard;

impl DepthGuard {
    fn enter() -> TlvResult<Self> {
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > MAX_DEPTH {
                return Err(TlvError::NestingTooDeep(MAX_DEPTH));
            }
            depth.set(next);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// A structured value with tagged fields
pub trait TlvRecord: Sized {
    /// Validated schema of this record type, built once
    ///
    /// # Errors
    /// Returns the registration error (malformed or duplicate tag,
    /// unsupported shape) on every call if the schema is invalid.
    fn schema() -> TlvResult<&'static RecordSchema>;

    /// Write every field through [`encode_field`], in schema order
    fn encode_fields(&self, schema: &RecordSchema, writer: &mut TlvWriter) -> TlvResult<()>;

    /// Decode one fragment into the field at schema position `index`
    fn decode_field(&mut self, index: usize, fragment: &[u8]) -> TlvResult<()>;
}

impl RecordRef {
    /// Reference to the schema of record type `R`
    pub fn of<R: TlvRecord>() -> Self {
        RecordRef::new(std::any::type_name::<R>(), R::schema)
    }
}

/// Write one field of a record
///
/// Absent values are skipped; present values are written under the field's
/// tag.
pub fn encode_field<T: TlvValue>(
    value: &T,
    field: &FieldSchema,
    writer: &mut TlvWriter,
) -> TlvResult<()> {
    if !value.is_present() {
        return Ok(());
    }
    value.encode_into(Some(field.tag()), writer)
}

/// Write a whole record
///
/// The fields are wrapped as `tag || length || fields`; with `tag == None`
/// the fields are written bare.
pub fn encode_record<R: TlvRecord>(
    record: &R,
    tag: Option<Tag>,
    writer: &mut TlvWriter,
) -> TlvResult<()> {
    let schema = R::schema()?;
    writer.write_nested(tag, |body| record.encode_fields(schema, body))
}

/// Populate a record from one region
///
/// Fields whose tag does not occur are left untouched. Each fragment of a
/// field is decoded in wire order: collections gain one element per
/// fragment, other fields are overwritten so the last occurrence wins.
/// Fragments under tags the schema does not declare are ignored.
///
/// On error the record may already hold some decoded fields.
///
/// # Errors
/// Returns `TlvError::NestingTooDeep` once records nest more than
/// [`MAX_DEPTH`] levels, besides any malformed-input error.
pub fn decode_record<R: TlvRecord>(record: &mut R, region: &[u8]) -> TlvResult<()> {
    let _level = DepthGuard::enter()?;
    let schema = R::schema()?;
    let fragments = FragmentMap::index(region)?;

    for (index, field) in schema.fields().iter().enumerate() {
        for fragment in fragments.get(field.tag()) {
            record.decode_field(index, fragment)?;
        }
    }

    if log::log_enabled!(log::Level::Trace) {
        for tag in fragments.tags() {
            if schema.field_by_tag(tag).is_none() {
                log::trace!("record {}: ignoring undeclared tag {}", schema.name(), tag);
            }
        }
    }
    Ok(())
}

/// Error for a field index outside the schema of `R`
pub fn unknown_field<R: TlvRecord>(index: usize) -> TlvError {
    TlvError::Schema(format!(
        "record {} has no field #{}",
        std::any::type_name::<R>(),
        index
    ))
}
