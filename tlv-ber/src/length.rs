//! BER length octets

use bytes::BufMut;
use tlv_core::{TlvError, TlvResult};

/// First length byte of the (unsupported) indefinite form
const INDEFINITE: u8 = 0x80;

/// Largest number of length octets accepted in the long form
pub const MAX_LENGTH_OCTETS: usize = 4;

/// BER Length encoding
///
/// # Encoding Format
///
/// Short form:
/// ```text
/// Byte: 0 L L L L L L L
/// ```
/// Where L = length value (0-127)
///
/// Long form:
/// ```text
/// First byte:  1 N N N N N N N  (N = number of length bytes, 1-4)
/// Following bytes: L L L L L L L L  (big-endian length value, minimal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    /// Short form: length 0-127
    Short(u8),
    /// Long form: length > 127, encoded with length-of-length
    Long(u32),
}

impl BerLength {
    /// Create a new BER length
    ///
    /// Automatically chooses short or long form based on the length value.
    pub fn new(length: u32) -> Self {
        if length <= 0x7F {
            BerLength::Short(length as u8)
        } else {
            BerLength::Long(length)
        }
    }

    /// Create a BER length for a payload of `length` bytes
    ///
    /// # Errors
    ///
    /// Returns `TlvError::LengthOverflow` if the payload needs more than
    /// four length octets.
    pub fn for_payload(length: usize) -> TlvResult<Self> {
        u32::try_from(length)
            .map(Self::new)
            .map_err(|_| TlvError::LengthOverflow(length))
    }

    /// Get the length value
    pub fn value(&self) -> usize {
        match self {
            BerLength::Short(l) => *l as usize,
            BerLength::Long(l) => *l as usize,
        }
    }

    /// Number of bytes this length occupies on the wire
    pub fn encoded_len(&self) -> usize {
        match self {
            BerLength::Short(_) => 1,
            BerLength::Long(l) => 1 + Self::significant_octets(*l),
        }
    }

    fn significant_octets(length: u32) -> usize {
        let leading_zero_octets = (length.leading_zeros() / 8) as usize;
        MAX_LENGTH_OCTETS - leading_zero_octets
    }

    /// Append the length octets to `out`
    pub fn encode_into<B: BufMut>(&self, out: &mut B) {
        match self {
            BerLength::Short(length) => out.put_u8(*length),
            BerLength::Long(length) => {
                let octets = Self::significant_octets(*length);
                out.put_u8(0x80 | octets as u8);
                out.put_slice(&length.to_be_bytes()[MAX_LENGTH_OCTETS - octets..]);
            }
        }
    }

    /// Encode length to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }

    /// Decode length from the front of `data`
    ///
    /// # Returns
    /// Returns `Ok((BerLength, bytes_consumed))` if successful.
    ///
    /// # Errors
    /// - `TlvError::IndefiniteLength` for the reserved `0x80` byte
    /// - `TlvError::UnsupportedLengthForm` for more than 4 length octets
    /// - `TlvError::Truncated` if the buffer ends inside the length
    pub fn decode(data: &[u8]) -> TlvResult<(Self, usize)> {
        let first = *data.first().ok_or(TlvError::truncated(1, 0))?;

        if first & 0x80 == 0 {
            return Ok((BerLength::Short(first), 1));
        }
        if first == INDEFINITE {
            return Err(TlvError::IndefiniteLength);
        }

        let octets = (first & 0x7F) as usize;
        if octets > MAX_LENGTH_OCTETS {
            return Err(TlvError::UnsupportedLengthForm(octets as u8));
        }
        let bytes = data
            .get(1..1 + octets)
            .ok_or(TlvError::truncated(1 + octets, data.len()))?;

        // zero-extend into a 4-byte big-endian word
        let mut word = [0u8; MAX_LENGTH_OCTETS];
        word[MAX_LENGTH_OCTETS - octets..].copy_from_slice(bytes);
        Ok((Self::new(u32::from_be_bytes(word)), 1 + octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ber_length_short() {
        for n in [0u32, 1, 100, 127] {
            let encoded = BerLength::new(n).encode();
            assert_eq!(encoded, vec![n as u8]);
        }
    }

    #[test]
    fn test_ber_length_long_boundaries() {
        assert_eq!(BerLength::new(128).encode(), vec![0x81, 0x80]);
        assert_eq!(BerLength::new(255).encode(), vec![0x81, 0xFF]);
        assert_eq!(BerLength::new(256).encode(), vec![0x82, 0x01, 0x00]);
        assert_eq!(BerLength::new(0x0001_0000).encode(), vec![0x83, 0x01, 0x00, 0x00]);
        assert_eq!(
            BerLength::new(u32::MAX).encode(),
            vec![0x84, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_ber_length_encoded_len_matches_encode() {
        for n in [0u32, 127, 128, 255, 256, 65_535, 65_536, 16_777_216, u32::MAX] {
            let length = BerLength::new(n);
            assert_eq!(length.encoded_len(), length.encode().len());
        }
    }

    #[test]
    fn test_ber_length_round_trip() {
        let mut n: u64 = 0;
        while n <= u32::MAX as u64 {
            let encoded = BerLength::new(n as u32).encode();
            let (decoded, consumed) = BerLength::decode(&encoded).unwrap();
            assert_eq!(decoded.value() as u64, n);
            assert_eq!(consumed, encoded.len());
            n = n * 3 + 1;
        }
    }

    #[test]
    fn test_ber_length_decode_non_minimal_long_form() {
        let (length, consumed) = BerLength::decode(&[0x82, 0x00, 0x05]).unwrap();
        assert_eq!(length.value(), 5);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_ber_length_indefinite_rejected() {
        assert!(matches!(
            BerLength::decode(&[0x80, 0x01, 0x02]),
            Err(TlvError::IndefiniteLength)
        ));
    }

    #[test]
    fn test_ber_length_too_many_octets() {
        assert!(matches!(
            BerLength::decode(&[0x85, 0, 0, 0, 0, 1]),
            Err(TlvError::UnsupportedLengthForm(5))
        ));
    }

    #[test]
    fn test_ber_length_truncated() {
        assert!(matches!(BerLength::decode(&[]), Err(TlvError::Truncated { .. })));
        assert!(matches!(
            BerLength::decode(&[0x82, 0x01]),
            Err(TlvError::Truncated { needed: 3, available: 2 })
        ));
    }

    #[test]
    fn test_ber_length_for_payload() {
        assert_eq!(BerLength::for_payload(300).unwrap(), BerLength::Long(300));
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            BerLength::for_payload(u32::MAX as usize + 1),
            Err(TlvError::LengthOverflow(_))
        ));
    }
}
