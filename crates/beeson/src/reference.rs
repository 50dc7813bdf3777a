//! Content references and the hashing collaborator that produces them.
//!
//! Out-of-band schemas are named by the Swarm chunk address of their bytes:
//! a keccak-256 binary Merkle tree over 32-byte segments, prefixed with the
//! little-endian span, extended to a chunk tree for blobs larger than one
//! 4096-byte chunk.

use sha3::{Digest, Keccak256};

use crate::constants::{REFERENCE_LENGTH, SEGMENT_SIZE};

/// A 32-byte content hash naming an out-of-band blob.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference(pub [u8; REFERENCE_LENGTH]);

impl Reference {
    pub const fn new(bytes: [u8; REFERENCE_LENGTH]) -> Self {
        Reference(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; REFERENCE_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl From<[u8; REFERENCE_LENGTH]> for Reference {
    fn from(bytes: [u8; REFERENCE_LENGTH]) -> Self {
        Reference(bytes)
    }
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reference({})", self.to_hex())
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes the reference under which a serialized schema is stored.
pub trait SchemaHasher: Send + Sync {
    fn hash(&self, bytes: &[u8]) -> Reference;
}

/// Swarm BMT chunked-file addressing.
#[derive(Debug, Default, Clone, Copy)]
pub struct BmtHasher;

/// Payload capacity of one chunk.
pub const CHUNK_PAYLOAD_SIZE: usize = 4096;

/// References per intermediate chunk.
const BRANCHES: usize = CHUNK_PAYLOAD_SIZE / REFERENCE_LENGTH;

fn keccak(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(*part);
    }
    hasher.finalize().into()
}

/// Address of a single chunk with the given span and payload (at most
/// [`CHUNK_PAYLOAD_SIZE`] bytes).
pub fn chunk_address(span: u64, payload: &[u8]) -> Reference {
    debug_assert!(payload.len() <= CHUNK_PAYLOAD_SIZE);
    let mut level: Vec<[u8; 32]> = (0..CHUNK_PAYLOAD_SIZE / SEGMENT_SIZE)
        .map(|i| {
            let mut segment = [0u8; 32];
            let start = (i * SEGMENT_SIZE).min(payload.len());
            let end = ((i + 1) * SEGMENT_SIZE).min(payload.len());
            segment[..end - start].copy_from_slice(&payload[start..end]);
            segment
        })
        .collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| keccak(&[&pair[0][..], &pair[1][..]]))
            .collect();
    }
    Reference(keccak(&[&span.to_le_bytes()[..], &level[0][..]]))
}

impl SchemaHasher for BmtHasher {
    fn hash(&self, bytes: &[u8]) -> Reference {
        if bytes.len() <= CHUNK_PAYLOAD_SIZE {
            return chunk_address(bytes.len() as u64, bytes);
        }

        let mut level: Vec<(Reference, u64)> = bytes
            .chunks(CHUNK_PAYLOAD_SIZE)
            .map(|chunk| (chunk_address(chunk.len() as u64, chunk), chunk.len() as u64))
            .collect();

        while level.len() > 1 {
            let groups = level.len().div_ceil(BRANCHES);
            let mut next = Vec::with_capacity(groups);
            for (i, group) in level.chunks(BRANCHES).enumerate() {
                // A lone trailing chunk is carried up unchanged.
                if group.len() == 1 && i == groups - 1 {
                    next.push(group[0]);
                    continue;
                }
                let span: u64 = group.iter().map(|(_, span)| span).sum();
                let payload: Vec<u8> = group.iter().flat_map(|(r, _)| r.0).collect();
                next.push((chunk_address(span, &payload), span));
            }
            level = next;
        }

        level[0].0
    }
}
