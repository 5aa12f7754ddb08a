//! Bit-exact conversions between integers, strings and byte arrays.
//!
//! Every encoding here is part of the externally observable byte contract:
//! integers are minimum-length big-endian (zero encodes to a single `0x00`
//! byte), strings are UTF-8 without BOM.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::errors::CryptoError;

/// Minimum-length big-endian encoding of a non-negative integer.
///
/// `0` encodes to `[0x00]`; all other values carry no leading zero byte.
pub fn integer_to_byte_array(value: &BigUint) -> Vec<u8> {
    // BigUint::to_bytes_be yields [0] for zero and strips leading zero
    // bytes otherwise, which is the minimal big-endian form.
    value.to_bytes_be()
}

/// Big-endian decoding of a non-empty byte array.
pub fn byte_array_to_integer(bytes: &[u8]) -> Result<BigUint, CryptoError> {
    if bytes.is_empty() {
        return Err(CryptoError::InvalidEncoding(
            "cannot convert an empty byte array to an integer".to_string(),
        ));
    }
    Ok(BigUint::from_bytes_be(bytes))
}

/// UTF-8 encoding of a string.
pub fn string_to_byte_array(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

/// UTF-8 decoding of a non-empty byte array.
pub fn byte_array_to_string(bytes: &[u8]) -> Result<String, CryptoError> {
    if bytes.is_empty() {
        return Err(CryptoError::InvalidEncoding(
            "cannot convert an empty byte array to a string".to_string(),
        ));
    }
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CryptoError::InvalidEncoding(format!("byte array is not valid UTF-8: {e}")))
}

/// Decimal rendering of a non-negative integer, no sign, no padding.
pub fn integer_to_string(value: &BigUint) -> String {
    value.to_str_radix(10)
}

/// Parses a decimal string: at least one digit, no sign, no whitespace.
pub fn string_to_integer(value: &str) -> Result<BigUint, CryptoError> {
    if value.is_empty() {
        return Err(CryptoError::InvalidEncoding(
            "cannot parse an empty string as a decimal integer".to_string(),
        ));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CryptoError::InvalidEncoding(format!(
            "string \"{value}\" is not a sequence of decimal digits"
        )));
    }
    BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| {
        CryptoError::InvalidEncoding(format!("string \"{value}\" is not a decimal integer"))
    })
}

/// Cuts a byte array to the requested bit length by truncating the
/// most-significant byte, keeping its least-significant `bits % 8` bits.
///
/// With `bits` a multiple of eight the array passes through unchanged.
pub(crate) fn truncate_to_bit_length(mut bytes: Vec<u8>, bits: usize) -> Vec<u8> {
    debug_assert_eq!(bytes.len(), (bits + 7) / 8);
    let remainder = bits % 8;
    if remainder != 0 {
        if let Some(first) = bytes.first_mut() {
            *first &= (1u8 << remainder) - 1;
        }
    }
    bytes
}

/// Number of bits in the binary representation of `value`, with
/// `bit_length(0) = 0`.
pub(crate) fn bit_length(value: &BigUint) -> usize {
    if value.is_zero() {
        0
    } else {
        value.bits() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use num_traits::One;

    #[test]
    fn zero_encodes_to_a_single_zero_byte() {
        assert_eq!(integer_to_byte_array(&BigUint::zero()), vec![0x00]);
    }

    #[test]
    fn small_integers_encode_big_endian_minimal() {
        assert_eq!(integer_to_byte_array(&BigUint::from(255u32)), vec![0xff]);
        assert_eq!(
            integer_to_byte_array(&BigUint::from(256u32)),
            vec![0x01, 0x00]
        );
        assert_eq!(
            integer_to_byte_array(&(BigUint::one() << 31)),
            vec![0x80, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn integer_byte_round_trip() {
        for value in [0u64, 1, 127, 128, 255, 256, 65535, 65536, u64::MAX] {
            let x = BigUint::from(value);
            let bytes = integer_to_byte_array(&x);
            assert_eq!(byte_array_to_integer(&bytes).unwrap(), x);
        }
    }

    #[test]
    fn byte_integer_round_trip_without_leading_zero() {
        let bytes = vec![0x02, 0x00, 0xff];
        let x = byte_array_to_integer(&bytes).unwrap();
        assert_eq!(integer_to_byte_array(&x), bytes);
    }

    #[test]
    fn leading_zero_bytes_are_not_preserved() {
        let bytes = vec![0x00, 0x01];
        let x = byte_array_to_integer(&bytes).unwrap();
        assert_eq!(integer_to_byte_array(&x), vec![0x01]);
    }

    #[test]
    fn empty_byte_array_is_rejected() {
        assert!(byte_array_to_integer(&[]).is_err());
        assert!(byte_array_to_string(&[]).is_err());
    }

    #[test]
    fn string_round_trip() {
        for s in ["", "abc", "züri", "投票", "\u{1F512}"] {
            let bytes = string_to_byte_array(s);
            if s.is_empty() {
                assert!(byte_array_to_string(&bytes).is_err());
            } else {
                assert_eq!(byte_array_to_string(&bytes).unwrap(), s);
            }
        }
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(byte_array_to_string(&[0xc3, 0x28]).is_err());
    }

    #[test]
    fn decimal_strings_parse_strictly() {
        assert_eq!(
            string_to_integer("1234567890").unwrap(),
            BigUint::from(1234567890u64)
        );
        assert_eq!(integer_to_string(&BigUint::from(42u8)), "42");
        assert!(string_to_integer("").is_err());
        assert!(string_to_integer("-1").is_err());
        assert!(string_to_integer(" 1").is_err());
        assert!(string_to_integer("1a").is_err());
    }

    #[test]
    fn bit_truncation_masks_the_most_significant_byte() {
        assert_eq!(truncate_to_bit_length(vec![0xff, 0xff], 13), vec![0x1f, 0xff]);
        assert_eq!(truncate_to_bit_length(vec![0xff, 0xff], 16), vec![0xff, 0xff]);
    }
}
