//! Core types for the BER-style TLV codec
//!
//! This crate provides the error type shared by every layer of the codec and
//! the [`Tag`] identifier that names a field within one structural level.

pub mod error;
pub mod tag;

pub use error::{BoxError, TlvError, TlvResult};
pub use tag::Tag;
