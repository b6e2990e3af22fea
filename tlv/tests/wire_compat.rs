//! Byte-exact wire vectors for interoperability with existing encoders

use bytes::Bytes;
use tlv::{BinaryCodec, BoxError, Tlv, TlvCustom, TlvError};

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

#[derive(Debug, Default, PartialEq, Tlv)]
struct Int64Value {
    #[tlv("1E")]
    value: i64,
}

#[derive(Debug, Default, PartialEq, Tlv)]
struct Int32Value {
    #[tlv("2F")]
    value: i32,
}

#[derive(Debug, Default, PartialEq, Tlv)]
struct Int16Value {
    #[tlv("20")]
    value: i16,
}

#[derive(Debug, Default, PartialEq, Tlv)]
struct Int8Value {
    #[tlv("21")]
    value: i8,
}

#[derive(Debug, Default, PartialEq, Tlv)]
struct Entry {
    #[tlv("14")]
    name: Bytes,
    #[tlv("28")]
    sequence: u16,
}

#[derive(Debug, Default, PartialEq, Tlv)]
struct EntryList {
    #[tlv("50")]
    entries: Vec<Entry>,
}

/// Integer written as ASCII decimal digits
#[derive(Debug, Default, PartialEq, TlvCustom)]
struct Decimal(u32);

impl BinaryCodec for Decimal {
    fn marshal_binary(&self) -> Result<Vec<u8>, BoxError> {
        Ok(self.0.to_string().into_bytes())
    }

    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), BoxError> {
        self.0 = std::str::from_utf8(data)?.parse()?;
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Tlv)]
struct DecimalList {
    #[tlv("7B")]
    values: Vec<Decimal>,
}

fn check<T>(value: T, wire: &str)
where
    T: tlv::TlvValue + Default + PartialEq + std::fmt::Debug,
{
    let bytes = hex(wire);
    assert_eq!(tlv::marshal(&value).unwrap(), bytes, "encoding {value:?}");
    assert_eq!(tlv::from_bytes::<T>(&bytes).unwrap(), value, "decoding {wire}");
}

#[test]
fn test_int64() {
    check(Int64Value { value: 32324 }, "1E080000000000007E44");
}

#[test]
fn test_int32() {
    check(Int32Value { value: 32324 }, "2F0400007E44");
}

#[test]
fn test_int16() {
    check(Int16Value { value: 32324 }, "20027E44");
}

#[test]
fn test_int8() {
    check(Int8Value { value: 68 }, "210144");
}

#[test]
fn test_repeated_records() {
    let list = EntryList {
        entries: vec![
            Entry {
                name: Bytes::from_static(b"Hello"),
                sequence: 1,
            },
            Entry {
                name: Bytes::from_static(b"World"),
                sequence: 2,
            },
            Entry {
                name: Bytes::from_static(b"free5gc"),
                sequence: 3,
            },
        ],
    };
    check(
        list,
        "500B140548656C6C6F28020001500B1405576F726C6428020002500D14076672656535676328020003",
    );
}

#[test]
fn test_repeated_custom_codec() {
    let list = DecimalList {
        values: vec![Decimal(1100), Decimal(1200), Decimal(3244)],
    };
    check(list, "7B04313130307B04313230307B0433323434");
}

#[test]
fn test_custom_codec_failure() {
    // second element is not ASCII
    let err = tlv::from_bytes::<DecimalList>(&hex("7B0231327B01FF")).unwrap_err();
    assert!(matches!(err, TlvError::Delegate { type_name, .. } if type_name.ends_with("Decimal")));
}
