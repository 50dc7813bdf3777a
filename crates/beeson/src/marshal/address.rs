//! Swarm address values and their CID text form.
//!
//! On the wire an address is the raw 32-byte reference. As text it is a
//! CIDv1 rendered in multibase base32: `b` followed by the lower-case,
//! unpadded base32 of `0x01 | codec | 0x1b | 0x20 | digest`, where the codec
//! distinguishes manifests from feeds and `0x1b 0x20` names a 32-byte
//! keccak-256 digest.

use beeson_base32::{from_base32, to_base32};

use crate::constants::REFERENCE_LENGTH;
use crate::error::FormatError;
use crate::reference::Reference;

const CID_VERSION: u8 = 0x01;
const KECCAK_256: u8 = 0x1b;
const MULTIBASE_BASE32: char = 'b';

/// Which kind of Swarm resource an address points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    Manifest,
    Feed,
}

impl AddressKind {
    /// Varint-encoded multicodec.
    const fn codec(self) -> [u8; 2] {
        match self {
            AddressKind::Manifest => [0xfa, 0x01],
            AddressKind::Feed => [0xfb, 0x01],
        }
    }
}

/// Renders `reference` as a CID of the given kind.
pub fn to_cid(kind: AddressKind, reference: &Reference) -> String {
    let mut bytes = Vec::with_capacity(6 + REFERENCE_LENGTH);
    bytes.push(CID_VERSION);
    bytes.extend_from_slice(&kind.codec());
    bytes.push(KECCAK_256);
    bytes.push(REFERENCE_LENGTH as u8);
    bytes.extend_from_slice(reference.as_bytes());
    let mut cid = String::with_capacity(1 + bytes.len() * 8 / 5 + 1);
    cid.push(MULTIBASE_BASE32);
    cid.push_str(&to_base32(&bytes));
    cid
}

/// Parses a CID of exactly the given kind. Only the canonical text form is
/// accepted: lower-case, unpadded, zero trailing bits.
pub fn parse_cid(kind: AddressKind, cid: &str) -> Result<Reference, FormatError> {
    let invalid = |reason: &str| FormatError::InvalidAddress(format!("{}: {}", reason, cid));
    let body = cid
        .strip_prefix(MULTIBASE_BASE32)
        .ok_or_else(|| invalid("not a base32 multibase string"))?;
    let bytes = from_base32(body).map_err(|err| invalid(&err.to_string()))?;
    let codec = kind.codec();
    let expected_prefix = [
        CID_VERSION,
        codec[0],
        codec[1],
        KECCAK_256,
        REFERENCE_LENGTH as u8,
    ];
    let digest = bytes
        .strip_prefix(&expected_prefix[..])
        .ok_or_else(|| invalid("unexpected CID prefix"))?;
    let digest: [u8; REFERENCE_LENGTH] = digest
        .try_into()
        .map_err(|_| invalid("digest is not 32 bytes"))?;
    let reference = Reference::new(digest);
    if to_cid(kind, &reference) != cid {
        return Err(invalid("non-canonical CID text"));
    }
    Ok(reference)
}

/// Decodes a raw address payload.
pub fn decode(payload: &[u8]) -> Result<Reference, FormatError> {
    let bytes: [u8; REFERENCE_LENGTH] = payload
        .get(..REFERENCE_LENGTH)
        .ok_or(FormatError::UnexpectedEof)?
        .try_into()
        .map_err(|_| FormatError::UnexpectedEof)?;
    Ok(Reference::new(bytes))
}
