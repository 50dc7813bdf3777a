//! Base32 encoding.

use crate::constants::ALPHABET;

/// Encodes bytes as unpadded lower-case base32.
///
/// # Example
///
/// ```
/// use beeson_base32::to_base32;
///
/// assert_eq!(to_base32(b""), "");
/// assert_eq!(to_base32(b"f"), "my");
/// assert_eq!(to_base32(b"foobar"), "mzxw6ytboi");
/// ```
pub fn to_base32(uint8: &[u8]) -> String {
    let table = ALPHABET.as_bytes();
    let mut out = String::with_capacity((uint8.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in uint8 {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(table[((buffer >> bits) & 0b1_1111) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        out.push(table[((buffer << (5 - bits)) & 0b1_1111) as usize] as char);
    }

    out
}
