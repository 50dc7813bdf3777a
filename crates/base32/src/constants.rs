/// Lower-case RFC 4648 base32 alphabet, as used by the multibase `b` prefix.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz234567";

/// Padding character (only tolerated on decode).
pub const PAD: char = '=';
