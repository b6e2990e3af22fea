use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by custom binary codecs
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for TLV encoding and decoding
///
/// Every variant aborts the whole `marshal`/`unmarshal` call it occurs in;
/// there is no partial-success mode.
#[derive(Error, Debug, Clone)]
pub enum TlvError {
    /// Missing or malformed tag annotation, or an inconsistent record schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Long-form length announcing more than 4 length octets
    #[error("Unsupported length form: {0} length octets (max 4)")]
    UnsupportedLengthForm(u8),

    /// The reserved `0x80` length byte
    #[error("Indefinite length encoding not supported")]
    IndefiniteLength,

    /// Fewer bytes available than a tag, length or value requires
    #[error("Truncated input: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// A value shape the engine cannot encode or decode in this position
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Wrong kind of value handed to a top-level entry point
    #[error("Usage error: {0}")]
    Usage(String),

    /// Text field whose bytes are not valid UTF-8
    #[error("Invalid text: {0}")]
    InvalidText(String),

    /// Payload too large for a 4-octet length
    #[error("Length overflow: {0} bytes does not fit in 4 length octets")]
    LengthOverflow(usize),

    /// Records nested deeper than the decoder accepts
    #[error("Nesting too deep: more than {0} nested records")]
    NestingTooDeep(usize),

    /// A custom binary codec failed
    #[error("Custom codec error in {type_name}: {source}")]
    Delegate {
        type_name: &'static str,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl TlvError {
    /// Wrap the failure of a custom codec for type `type_name`
    pub fn delegate(type_name: &'static str, source: BoxError) -> Self {
        TlvError::Delegate {
            type_name,
            source: Arc::from(source),
        }
    }

    /// Build a [`TlvError::Truncated`] for a read of `needed` bytes
    pub fn truncated(needed: usize, available: usize) -> Self {
        TlvError::Truncated { needed, available }
    }
}

/// Result type alias for TLV operations
pub type TlvResult<T> = Result<T, TlvError>;
