//! Object tables:
//! `N: u16 | M: u16 | markers: u16 | (tag: u16, segments: u32, marker: u16) * (N+M) | marker blob`.
//!
//! Each entry's marker length is a delta into the blob; markers are walked in
//! table order and must be strictly ascending byte-wise.

use beeson_buffers::{Reader, Writer};
use tracing::trace;

use super::{
    counts, decode_segment_length, decode_slot, encode_segment_length, read_tail, write_tail,
    Table, TableEntry,
};
use crate::constants::OBJECT_ENTRY_LENGTH;
use crate::error::FormatError;
use crate::reference::Reference;

pub fn write_table(
    nullable: bool,
    entries: &[TableEntry],
    references: &[Reference],
) -> Result<Vec<u8>, FormatError> {
    let (inline, supers) = counts(entries, references)?;
    let markers: Vec<&str> = entries
        .iter()
        .map(|entry| entry.marker.as_deref().unwrap_or_default())
        .collect();
    let blob_length: usize = markers.iter().map(|marker| marker.len()).sum();
    let blob_length =
        u16::try_from(blob_length).map_err(|_| FormatError::LengthOverflow("marker blob"))?;

    let mut writer = Writer::with_capacity(
        6 + entries.len() * OBJECT_ENTRY_LENGTH + usize::from(blob_length),
    );
    writer.u16(inline);
    writer.u16(supers);
    writer.u16(blob_length);
    for (i, entry) in entries.iter().enumerate() {
        let marker_length = u16::try_from(markers[i].len())
            .map_err(|_| FormatError::LengthOverflow("marker"))?;
        writer.u16(entry.slot.code());
        writer.u32(encode_segment_length(i, entries)?);
        writer.u16(marker_length);
    }
    for marker in &markers {
        writer.utf8(marker);
    }
    let mut out = writer.flush();
    write_tail(&mut out, nullable, entries, references)?;
    trace!(entries = entries.len(), bytes = out.len(), "wrote object table");
    Ok(out)
}

pub fn read_table(nullable: bool, bytes: &[u8]) -> Result<Table, FormatError> {
    let mut reader = Reader::new(bytes);
    let inline = reader.u16()? as usize;
    let supers = reader.u16()? as usize;
    let blob_length = reader.u16()? as usize;
    let count = inline + supers;

    let mut entries = Vec::with_capacity(count);
    let mut marker_lengths = Vec::with_capacity(count);
    for i in 0..count {
        let slot = decode_slot(reader.u16()?)?;
        let segment_length = decode_segment_length(i, count, reader.u32()?)?;
        marker_lengths.push(reader.u16()? as usize);
        entries.push(TableEntry {
            slot,
            segment_length,
            marker: None,
            nullable: false,
        });
    }

    let mut blob = Reader::new(reader.buf(blob_length)?);
    let mut previous: Option<&str> = None;
    for (entry, length) in entries.iter_mut().zip(marker_lengths) {
        let marker = blob.utf8(length)?;
        if previous.is_some_and(|prev| prev.as_bytes() >= marker.as_bytes()) {
            return Err(FormatError::UnsortedMarkers);
        }
        previous = Some(marker);
        entry.marker = Some(marker.to_owned());
    }
    if blob.size() != 0 {
        return Err(FormatError::LengthOverflow("marker blob"));
    }

    let (references, byte_length) = read_tail(&mut reader, nullable, &mut entries, supers)?;
    trace!(entries = count, bytes = byte_length, "read object table");
    Ok(Table {
        entries,
        references,
        byte_length,
    })
}
