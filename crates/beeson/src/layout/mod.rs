//! Descriptor-table codecs for the container tags.
//!
//! A table is the schema section of one container level:
//!
//! ```text
//! lengths | N+M entries | [marker blob] | [nullable bits] | pad | M references
//! ```
//!
//! `N` counts inline entries and `M` counts entries whose schema is stored
//! out of band; the references of the latter follow the padded section in
//! table order. These functions are pure: resolving references is left to
//! the schema module.

pub mod array;
pub mod object;

use beeson_buffers::Reader;

use crate::bitvector::{byte_length, BitVector};
use crate::constants::{REFERENCE_LENGTH, UNKNOWN_SEGMENT_LENGTH};
use crate::error::FormatError;
use crate::reference::Reference;
use crate::segment::padded_length;
use crate::tag::{ContainerKind, SlotTag};

/// One descriptor as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub slot: SlotTag,
    /// `None` is the "rest of the slice" sentinel.
    pub segment_length: Option<u32>,
    /// Object tables only.
    pub marker: Option<String>,
    /// Schema-level nullability; only written for nullable containers.
    pub nullable: bool,
}

/// A decoded table before out-of-band schemas are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub entries: Vec<TableEntry>,
    /// One reference per `Super` entry, in table order.
    pub references: Vec<Reference>,
    /// Bytes the table occupies, references included.
    pub byte_length: usize,
}

/// Serializes a table. `references` must hold one reference per `Super`
/// entry in table order.
pub fn write_table(
    kind: ContainerKind,
    nullable: bool,
    entries: &[TableEntry],
    references: &[Reference],
) -> Result<Vec<u8>, FormatError> {
    match kind {
        ContainerKind::Array => array::write_table(nullable, entries, references),
        ContainerKind::Object => object::write_table(nullable, entries, references),
    }
}

pub fn read_table(kind: ContainerKind, nullable: bool, bytes: &[u8]) -> Result<Table, FormatError> {
    match kind {
        ContainerKind::Array => array::read_table(nullable, bytes),
        ContainerKind::Object => object::read_table(nullable, bytes),
    }
}

/// Splits the entries into inline and out-of-band counts.
fn counts(entries: &[TableEntry], references: &[Reference]) -> Result<(u16, u16), FormatError> {
    let supers = entries
        .iter()
        .filter(|entry| entry.slot == SlotTag::Super)
        .count();
    if supers != references.len() {
        return Err(FormatError::SuperCountMismatch {
            declared: supers,
            found: references.len(),
        });
    }
    let inline = u16::try_from(entries.len() - supers)
        .map_err(|_| FormatError::LengthOverflow("inline child count"))?;
    let supers = u16::try_from(supers)
        .map_err(|_| FormatError::LengthOverflow("indirected child count"))?;
    Ok((inline, supers))
}

fn encode_segment_length(index: usize, entries: &[TableEntry]) -> Result<u32, FormatError> {
    match entries[index].segment_length {
        Some(UNKNOWN_SEGMENT_LENGTH) => Err(FormatError::LengthOverflow("segment length")),
        Some(length) => Ok(length),
        None if index + 1 == entries.len() => Ok(UNKNOWN_SEGMENT_LENGTH),
        None => Err(FormatError::MisplacedUnknownLength(index)),
    }
}

fn decode_segment_length(index: usize, count: usize, raw: u32) -> Result<Option<u32>, FormatError> {
    if raw != UNKNOWN_SEGMENT_LENGTH {
        return Ok(Some(raw));
    }
    if index + 1 == count {
        Ok(None)
    } else {
        Err(FormatError::MisplacedUnknownLength(index))
    }
}

fn decode_slot(code: u16) -> Result<SlotTag, FormatError> {
    SlotTag::from_code(code).ok_or(FormatError::UnknownTypeTag(code))
}

fn nullable_bits(entries: &[TableEntry]) -> Result<BitVector, FormatError> {
    let mut bits = BitVector::new(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        if entry.nullable {
            bits.set(i).map_err(|_| FormatError::UnexpectedEof)?;
        }
    }
    Ok(bits)
}

/// Reads the nullable bits (if any), skips the padding and reads the
/// references. `reader` sits right after the entries (and marker blob).
fn read_tail(
    reader: &mut Reader<'_>,
    nullable: bool,
    entries: &mut [TableEntry],
    supers: usize,
) -> Result<(Vec<Reference>, usize), FormatError> {
    if nullable {
        let bytes = reader.buf(byte_length(entries.len()))?;
        let bits = BitVector::from_bytes(entries.len(), bytes)
            .map_err(|_| FormatError::UnexpectedEof)?;
        for i in bits.indices() {
            entries[i].nullable = true;
        }
    }
    let found = entries
        .iter()
        .filter(|entry| entry.slot == SlotTag::Super)
        .count();
    if found != supers {
        return Err(FormatError::SuperCountMismatch {
            declared: supers,
            found,
        });
    }
    reader.skip(padded_length(reader.x) - reader.x)?;
    let mut references = Vec::with_capacity(supers);
    for _ in 0..supers {
        references.push(Reference::new(reader.bytes32()?));
    }
    Ok((references, reader.x))
}

/// Appends the nullable bits, padding and references.
fn write_tail(
    out: &mut Vec<u8>,
    nullable: bool,
    entries: &[TableEntry],
    references: &[Reference],
) -> Result<(), FormatError> {
    if nullable {
        out.extend_from_slice(nullable_bits(entries)?.as_bytes());
    }
    crate::segment::pad_right(out);
    out.reserve(references.len() * REFERENCE_LENGTH);
    for reference in references {
        out.extend_from_slice(reference.as_bytes());
    }
    Ok(())
}
