//! RFC 4648 base32 encoding/decoding.
//!
//! BeeSon address values travel as Swarm CIDs, which are rendered in
//! multibase base32 (lower-case alphabet, no padding). This crate provides
//! exactly that codec.
//!
//! # Example
//!
//! ```
//! use beeson_base32::{from_base32, to_base32};
//!
//! let encoded = to_base32(b"hello");
//! assert_eq!(encoded, "nbswy3dp");
//! assert_eq!(from_base32(&encoded).unwrap(), b"hello");
//! ```

mod constants;
mod from_base32;
mod to_base32;

pub use constants::{ALPHABET, PAD};
pub use from_base32::from_base32;
pub use to_base32::to_base32;

/// Error type for base32 decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base32Error {
    /// A character outside the alphabet was found at the given position.
    InvalidChar(usize),
    /// The input length cannot be produced by the encoder.
    InvalidLength,
}

impl std::fmt::Display for Base32Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base32Error::InvalidChar(pos) => write!(f, "invalid base32 character at {}", pos),
            Base32Error::InvalidLength => write!(f, "invalid base32 length"),
        }
    }
}

impl std::error::Error for Base32Error {}
