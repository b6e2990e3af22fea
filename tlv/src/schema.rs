//! Schema model: shapes, field descriptors and record schemas
//!
//! Every type taking part in encoding declares a [`Shape`]. Records carry an
//! ordered list of [`FieldSchema`] entries, each pairing a field with its
//! validated [`Tag`]. A record schema is built once per type through
//! [`RecordSchemaBuilder`], which rejects malformed tags and unsupported
//! shapes at registration instead of on every call.

use std::collections::HashSet;
use std::fmt;
use tlv_core::{Tag, TlvError, TlvResult};

/// Width and signedness of a scalar integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntKind {
    /// Width in bytes: 1, 2, 4 or 8
    pub width: u8,
    /// Two's complement when set
    pub signed: bool,
}

impl IntKind {
    pub const I8: IntKind = IntKind { width: 1, signed: true };
    pub const I16: IntKind = IntKind { width: 2, signed: true };
    pub const I32: IntKind = IntKind { width: 4, signed: true };
    pub const I64: IntKind = IntKind { width: 8, signed: true };
    pub const U8: IntKind = IntKind { width: 1, signed: false };
    pub const U16: IntKind = IntKind { width: 2, signed: false };
    pub const U32: IntKind = IntKind { width: 4, signed: false };
    pub const U64: IntKind = IntKind { width: 8, signed: false };
}

/// Declared wire shape of a value
#[derive(Debug, Clone)]
pub enum Shape {
    /// Big-endian integer of fixed width
    Int(IntKind),
    /// UTF-8 text, written verbatim
    Text,
    /// Byte sequence, written verbatim
    Bytes,
    /// Explicitly optional value; absent values are not written
    Optional(Box<Shape>),
    /// Structured value whose fields each carry their own tag
    Record(RecordRef),
    /// Collection written as one same-tag record per element
    Repeated(Box<Shape>),
    /// Value with its own binary codec
    Custom,
}

impl Shape {
    /// Short human-readable name of the shape
    pub fn describe(&self) -> String {
        match self {
            Shape::Int(kind) => {
                let sign = if kind.signed { "i" } else { "u" };
                format!("{}{}", sign, kind.width as u32 * 8)
            }
            Shape::Text => "text".to_string(),
            Shape::Bytes => "bytes".to_string(),
            Shape::Optional(inner) => format!("optional {}", inner.describe()),
            Shape::Record(record) => format!("record {}", record.name()),
            Shape::Repeated(inner) => format!("repeated {}", inner.describe()),
            Shape::Custom => "custom".to_string(),
        }
    }

    /// Whether values of this shape may be elements of a repeated field
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Shape::Int(_) | Shape::Record(_) | Shape::Custom)
    }

    /// Whether a value of this shape may be handed to `marshal`/`unmarshal`
    pub fn is_top_level(&self) -> bool {
        match self {
            Shape::Record(_) | Shape::Custom => true,
            Shape::Optional(inner) => matches!(**inner, Shape::Record(_) | Shape::Custom),
            _ => false,
        }
    }

    /// Resolve every record schema reachable from this shape
    ///
    /// Surfaces registration errors of nested record types even when no
    /// value of that type is present. Each record type is visited once, so
    /// recursive types terminate.
    ///
    /// # Errors
    /// Returns the first registration error found.
    pub fn resolve_all(&self) -> TlvResult<()> {
        let mut visited = HashSet::new();
        self.resolve_into(&mut visited)
    }

    fn resolve_into(&self, visited: &mut HashSet<&'static str>) -> TlvResult<()> {
        match self {
            Shape::Optional(inner) | Shape::Repeated(inner) => inner.resolve_into(visited),
            Shape::Record(record) => {
                if !visited.insert(record.name()) {
                    return Ok(());
                }
                for field in record.schema()?.fields() {
                    field.shape().resolve_into(visited)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn validate(&self) -> TlvResult<()> {
        match self {
            // Some(empty) writes nothing and reads back as None
            Shape::Optional(inner) if matches!(**inner, Shape::Optional(_) | Shape::Repeated(_)) => {
                Err(TlvError::UnsupportedShape(format!(
                    "{} cannot be optional",
                    inner.describe()
                )))
            }
            Shape::Optional(inner) => inner.validate(),
            Shape::Repeated(element) if !element.is_repeatable() => {
                Err(TlvError::UnsupportedShape(format!(
                    "{} cannot be an element of a repeated field",
                    element.describe()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Reference to a record type's schema
///
/// Resolution is deferred until the schema is needed, which lets record types
/// refer to themselves through `Option<Box<_>>` fields.
#[derive(Clone, Copy)]
pub struct RecordRef {
    name: &'static str,
    resolve: fn() -> TlvResult<&'static RecordSchema>,
}

impl RecordRef {
    /// Create a reference from a name and a schema accessor
    pub fn new(name: &'static str, resolve: fn() -> TlvResult<&'static RecordSchema>) -> Self {
        Self { name, resolve }
    }

    /// Name of the referenced record type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve the referenced schema, building it on first use
    pub fn schema(&self) -> TlvResult<&'static RecordSchema> {
        (self.resolve)()
    }
}

impl fmt::Debug for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordRef").field(&self.name).finish()
    }
}

/// Descriptor of one record field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: &'static str,
    tag: Tag,
    shape: Shape,
}

impl FieldSchema {
    /// Field name as declared on the record
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Tag the field is written under
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Declared shape of the field
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// Ordered field descriptors of one record type
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: &'static str,
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Start building the schema of record `name`
    pub fn builder(name: &'static str) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name,
            fields: Vec::new(),
            error: None,
        }
    }

    /// Record type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Field at `index`
    ///
    /// # Errors
    /// Returns `TlvError::Schema` if the record has no such field.
    pub fn field(&self, index: usize) -> TlvResult<&FieldSchema> {
        self.fields.get(index).ok_or_else(|| {
            TlvError::Schema(format!("record {} has no field #{}", self.name, index))
        })
    }

    /// Field written under `tag`, if any
    pub fn field_by_tag(&self, tag: Tag) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.tag == tag)
    }
}

/// Builder validating a [`RecordSchema`]
///
/// The first error encountered is kept and reported by [`build`].
///
/// [`build`]: RecordSchemaBuilder::build
pub struct RecordSchemaBuilder {
    name: &'static str,
    fields: Vec<FieldSchema>,
    error: Option<TlvError>,
}

impl RecordSchemaBuilder {
    /// Declare the next field
    ///
    /// # Arguments
    /// * `name` - Field name
    /// * `tag` - Tag annotation, 2 or 4 hex digits (e.g. `"1E"`, `"1F20"`)
    /// * `shape` - Declared shape of the field
    pub fn field(mut self, name: &'static str, tag: &str, shape: Shape) -> Self {
        if self.error.is_some() {
            return self;
        }
        match Tag::from_hex(tag) {
            Ok(tag) => self.fields.push(FieldSchema { name, tag, shape }),
            Err(e) => {
                let reason = match e {
                    TlvError::Schema(msg) => msg,
                    other => other.to_string(),
                };
                self.error = Some(TlvError::Schema(format!(
                    "field {}.{}: {}",
                    self.name, name, reason
                )));
            }
        }
        self
    }

    /// Validate and finish the schema
    ///
    /// # Errors
    /// - `TlvError::Schema` for a missing or malformed tag, or two fields
    ///   sharing one tag
    /// - `TlvError::UnsupportedShape` for a repeated field whose element is
    ///   not an integer, record or custom-codec value
    pub fn build(self) -> TlvResult<RecordSchema> {
        let result = self.validate();
        match &result {
            Ok(schema) => log::debug!(
                "registered record schema {} with {} fields",
                schema.name,
                schema.fields.len()
            ),
            Err(e) => log::debug!("rejected record schema: {}", e),
        }
        result
    }

    fn validate(self) -> TlvResult<RecordSchema> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.tag) {
                return Err(TlvError::Schema(format!(
                    "field {}.{} reuses tag {}",
                    self.name, field.name, field.tag
                )));
            }
            field.shape.validate().map_err(|e| match e {
                TlvError::UnsupportedShape(msg) => TlvError::UnsupportedShape(format!(
                    "field {}.{}: {}",
                    self.name, field.name, msg
                )),
                other => other,
            })?;
        }

        Ok(RecordSchema {
            name: self.name,
            fields: self.fields,
        })
    }
}
