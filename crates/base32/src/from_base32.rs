//! Base32 decoding.

use crate::constants::PAD;
use crate::Base32Error;

fn decode_char(c: u8) -> Option<u32> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u32),
        b'A'..=b'Z' => Some((c - b'A') as u32),
        b'2'..=b'7' => Some((c - b'2') as u32 + 26),
        _ => None,
    }
}

/// Decodes base32 text (either case, trailing padding tolerated).
///
/// # Example
///
/// ```
/// use beeson_base32::from_base32;
///
/// assert_eq!(from_base32("mzxw6ytboi").unwrap(), b"foobar");
/// assert_eq!(from_base32("MZXW6YTBOI======").unwrap(), b"foobar");
/// assert!(from_base32("m1").is_err());
/// ```
pub fn from_base32(encoded: &str) -> Result<Vec<u8>, Base32Error> {
    let trimmed = encoded.trim_end_matches(PAD);
    // 1, 3 and 6 trailing characters cannot come out of the encoder.
    if matches!(trimmed.len() % 8, 1 | 3 | 6) {
        return Err(Base32Error::InvalidLength);
    }

    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for (pos, &c) in trimmed.as_bytes().iter().enumerate() {
        let value = decode_char(c).ok_or(Base32Error::InvalidChar(pos))?;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
        buffer &= (1 << bits) - 1;
    }

    Ok(out)
}
