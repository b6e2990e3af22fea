//! BER-style TLV plumbing
//!
//! Each value on the wire is a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag: 1-2 bytes] [Length: 1-5 bytes] [Value: Length bytes]
//! ```
//!
//! Only the BER length-octet conventions are reused, not the full standard:
//!
//! - **Short form** (1 byte): lengths 0-127, bit 7 clear
//! - **Long form** (2-5 bytes): first byte `0x80 | n` followed by `n` (1-4)
//!   big-endian length octets
//! - **Indefinite form** (`0x80` alone): rejected
//!
//! Values nest arbitrarily: the value of a constructed record is itself a
//! concatenation of TLV triplets, scoped to that level.

pub mod fragment;
pub mod length;
pub mod reader;
pub mod writer;

pub use fragment::FragmentMap;
pub use length::BerLength;
pub use reader::{RawRecord, TlvReader};
pub use writer::TlvWriter;
