//! The [`TlvValue`] trait and its implementations for built-in types
//!
//! | Rust type | Shape | Written when |
//! |---|---|---|
//! | `i8` … `u64` | `Int` | value ≠ 0 |
//! | `String` | `Text` | non-empty |
//! | `Bytes` | `Bytes` | non-empty; the only byte-sequence type |
//! | `Option<T>` | `Optional` | `Some(_)`, including `Some(0)` |
//! | `Box<T>` | shape of `T` | `T` is written |
//! | `Vec<T>` | `Repeated` | non-empty |
//!
//! Plain scalars treat zero as "absent" and are skipped by the record
//! encoder. Wrap a field in `Option` when zero is a meaningful value.
//!
//! `Vec<u8>` is a repeated `u8` (one record per byte), not a byte sequence;
//! `#[derive(Tlv)]` rejects it as a field type. Use [`Bytes`] instead.
//!
//! `Option<Vec<_>>` and `Option<Option<_>>` are rejected when the schema is
//! built: an empty inner value writes nothing and would decode as `None`.

use crate::schema::{IntKind, Shape};
use bytes::Bytes;
use tlv_ber::TlvWriter;
use tlv_core::{Tag, TlvError, TlvResult};

/// A value that can be written to and read from a TLV region
///
/// Implemented for integers, `String`, [`Bytes`], `Option`, `Box` and `Vec`
/// here, for records by `#[derive(Tlv)]`, and for custom-codec values by
/// `#[derive(TlvCustom)]`.
pub trait TlvValue {
    /// Declared wire shape of this type
    fn shape() -> Shape
    where
        Self: Sized;

    /// Whether the record encoder writes this value
    ///
    /// Absent values are skipped entirely; no TLV is emitted for them.
    fn is_present(&self) -> bool;

    /// Write this value under `tag`
    ///
    /// With `tag == None` the value is written without its outer envelope;
    /// this is how top-level records are marshalled.
    fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()>;

    /// Populate this value from one fragment
    ///
    /// `region` is the value part of a single TLV record. Collections append
    /// one element per call; everything else is overwritten.
    fn decode_from(&mut self, region: &[u8]) -> TlvResult<()>;
}

macro_rules! impl_int_value {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl TlvValue for $ty {
                fn shape() -> Shape {
                    Shape::Int($kind)
                }

                fn is_present(&self) -> bool {
                    *self != 0
                }

                fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()> {
                    writer.write_tlv(tag, &self.to_be_bytes())
                }

                fn decode_from(&mut self, region: &[u8]) -> TlvResult<()> {
                    const WIDTH: usize = std::mem::size_of::<$ty>();
                    let leading = region
                        .first_chunk::<WIDTH>()
                        .ok_or(TlvError::truncated(WIDTH, region.len()))?;
                    *self = <$ty>::from_be_bytes(*leading);
                    Ok(())
                }
            }
        )*
    };
}

impl_int_value! {
    i8 => IntKind::I8,
    i16 => IntKind::I16,
    i32 => IntKind::I32,
    i64 => IntKind::I64,
    u8 => IntKind::U8,
    u16 => IntKind::U16,
    u32 => IntKind::U32,
    u64 => IntKind::U64,
}

impl TlvValue for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn is_present(&self) -> bool {
        !self.is_empty()
    }

    fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()> {
        writer.write_tlv(tag, self.as_bytes())
    }

    fn decode_from(&mut self, region: &[u8]) -> TlvResult<()> {
        let text = std::str::from_utf8(region).map_err(|e| TlvError::InvalidText(e.to_string()))?;
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

impl TlvValue for Bytes {
    fn shape() -> Shape {
        Shape::Bytes
    }

    fn is_present(&self) -> bool {
        !self.is_empty()
    }

    fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()> {
        writer.write_tlv(tag, self)
    }

    fn decode_from(&mut self, region: &[u8]) -> TlvResult<()> {
        *self = Bytes::copy_from_slice(region);
        Ok(())
    }
}

impl<T: TlvValue + Default> TlvValue for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()> {
        match self {
            Some(value) => value.encode_into(tag, writer),
            None => Ok(()),
        }
    }

    fn decode_from(&mut self, region: &[u8]) -> TlvResult<()> {
        self.get_or_insert_with(T::default).decode_from(region)
    }
}

impl<T: TlvValue> TlvValue for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn is_present(&self) -> bool {
        self.as_ref().is_present()
    }

    fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()> {
        self.as_ref().encode_into(tag, writer)
    }

    fn decode_from(&mut self, region: &[u8]) -> TlvResult<()> {
        self.as_mut().decode_from(region)
    }
}

impl<T: TlvValue + Default> TlvValue for Vec<T> {
    fn shape() -> Shape {
        Shape::Repeated(Box::new(T::shape()))
    }

    fn is_present(&self) -> bool {
        !self.is_empty()
    }

    /// Every element becomes its own record under the same tag.
    fn encode_into(&self, tag: Option<Tag>, writer: &mut TlvWriter) -> TlvResult<()> {
        for element in self {
            element.encode_into(tag, writer)?;
        }
        Ok(())
    }

    fn decode_from(&mut self, region: &[u8]) -> TlvResult<()> {
        let mut element = T::default();
        element.decode_from(region)?;
        self.push(element);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: TlvValue>(value: &T, tag: &str) -> Vec<u8> {
        let mut writer = TlvWriter::new();
        value
            .encode_into(Some(Tag::from_hex(tag).unwrap()), &mut writer)
            .unwrap();
        writer.into_bytes()
    }

    #[test]
    fn test_int_encoding_widths() {
        assert_eq!(encode(&32324i64, "1E"), vec![0x1E, 0x08, 0, 0, 0, 0, 0, 0, 0x7E, 0x44]);
        assert_eq!(encode(&32324i32, "2F"), vec![0x2F, 0x04, 0, 0, 0x7E, 0x44]);
        assert_eq!(encode(&32324i16, "20"), vec![0x20, 0x02, 0x7E, 0x44]);
        assert_eq!(encode(&68i8, "21"), vec![0x21, 0x01, 0x44]);
        assert_eq!(encode(&0xABCDu16, "28"), vec![0x28, 0x02, 0xAB, 0xCD]);
    }

    #[test]
    fn test_int_decode_sign_extends() {
        let mut value = 0i8;
        value.decode_from(&[0xFF]).unwrap();
        assert_eq!(value, -1);

        let mut wide = 0i32;
        wide.decode_from(&[0xFF, 0xFF, 0xFF, 0xFE]).unwrap();
        assert_eq!(wide, -2);
    }

    #[test]
    fn test_int_decode_ignores_trailing_bytes() {
        let mut value = 0u16;
        value.decode_from(&[0x7E, 0x44, 0x99]).unwrap();
        assert_eq!(value, 0x7E44);
    }

    #[test]
    fn test_int_decode_truncated() {
        let mut value = 0u32;
        assert!(matches!(
            value.decode_from(&[0x01, 0x02]),
            Err(TlvError::Truncated { needed: 4, available: 2 })
        ));
    }

    #[test]
    fn test_text_round_trip_and_invalid_utf8() {
        let mut text = String::from("stale");
        text.decode_from("free5gc".as_bytes()).unwrap();
        assert_eq!(text, "free5gc");
        assert!(matches!(text.decode_from(&[0xC3, 0x28]), Err(TlvError::InvalidText(_))));
    }

    #[test]
    fn test_bytes_verbatim() {
        let value = Bytes::from_static(b"Hello");
        assert_eq!(encode(&value, "14"), b"\x14\x05Hello".to_vec());
        let mut decoded = Bytes::new();
        decoded.decode_from(b"World").unwrap();
        assert_eq!(decoded, Bytes::from_static(b"World"));
    }

    #[test]
    fn test_option_presence() {
        let zero: Option<u8> = Some(0);
        assert!(zero.is_present());
        assert_eq!(encode(&zero, "21"), vec![0x21, 0x01, 0x00]);

        let none: Option<u8> = None;
        assert!(!none.is_present());
        assert!(encode(&none, "21").is_empty());

        let mut allocated: Option<u16> = None;
        allocated.decode_from(&[0x00, 0x07]).unwrap();
        assert_eq!(allocated, Some(7));
    }

    #[test]
    fn test_box_is_transparent() {
        assert!(matches!(<Box<u16>>::shape(), Shape::Int(IntKind::U16)));
        let mut boxed = Box::new(0i16);
        boxed.decode_from(&[0x7E, 0x44]).unwrap();
        assert_eq!(*boxed, 32324);
    }

    #[test]
    fn test_vec_emits_one_record_per_element() {
        let values: Vec<u16> = vec![1, 0, 3];
        assert_eq!(
            encode(&values, "28"),
            vec![0x28, 0x02, 0x00, 0x01, 0x28, 0x02, 0x00, 0x00, 0x28, 0x02, 0x00, 0x03]
        );

        let mut decoded: Vec<u16> = Vec::new();
        for fragment in [[0x00, 0x01], [0x00, 0x00], [0x00, 0x03]] {
            decoded.decode_from(&fragment).unwrap();
        }
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_zero_scalars_are_absent() {
        assert!(!0u64.is_present());
        assert!(!String::new().is_present());
        assert!(!Bytes::new().is_present());
        assert!(!Vec::<u8>::new().is_present());
    }
}
