//! Base58 as used by legacy Bitcoin addresses.
//!
//! The input is read as one big-endian unsigned integer and written out in base 58. Leading
//! zero bytes would vanish in that conversion, so each of them is kept as a leading `1`.

use crate::error::Base58DecodeError;
use num_bigint::BigUint;
use num_traits::Zero;
use std::iter::repeat;

/// No `0`, `O`, `I` or `l`.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const RADIX: u32 = 58;

pub fn encode(bytes: &[u8]) -> String {
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();
    let num = BigUint::from_bytes_be(bytes);

    let mut encoded = String::with_capacity(bytes.len() * 138 / 100 + 1);
    encoded.extend(repeat(ALPHABET[0] as char).take(zeros));
    if !num.is_zero() {
        encoded.extend(
            num.to_radix_be(RADIX)
                .into_iter()
                .map(|digit| ALPHABET[digit as usize] as char),
        );
    }
    encoded
}

pub fn decode(encoded: &str) -> Result<Vec<u8>, Base58DecodeError> {
    let digits = encoded
        .chars()
        .enumerate()
        .map(|(position, character)| {
            ALPHABET
                .iter()
                .position(|&x| x as char == character)
                .map(|d| d as u8)
                .ok_or(Base58DecodeError::InvalidCharacter {
                    character,
                    position,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let zeros = digits.iter().take_while(|&&d| d == 0).count();
    let mut bytes = vec![0_u8; zeros];
    let significant = &digits[zeros..];
    if !significant.is_empty() {
        let num = BigUint::from_radix_be(significant, RADIX).unwrap_or_default();
        bytes.extend(num.to_bytes_be());
    }
    Ok(bytes)
}
