//! Array tables: `N: u16 | M: u16 | (tag: u16, segments: u32) * (N+M)`.

use beeson_buffers::{Reader, Writer};
use tracing::trace;

use super::{
    counts, decode_segment_length, decode_slot, encode_segment_length, read_tail, write_tail,
    Table, TableEntry,
};
use crate::constants::ARRAY_ENTRY_LENGTH;
use crate::error::FormatError;
use crate::reference::Reference;

pub fn write_table(
    nullable: bool,
    entries: &[TableEntry],
    references: &[Reference],
) -> Result<Vec<u8>, FormatError> {
    let (inline, supers) = counts(entries, references)?;
    let mut writer = Writer::with_capacity(4 + entries.len() * ARRAY_ENTRY_LENGTH);
    writer.u16(inline);
    writer.u16(supers);
    for (i, entry) in entries.iter().enumerate() {
        writer.u16(entry.slot.code());
        writer.u32(encode_segment_length(i, entries)?);
    }
    let mut out = writer.flush();
    write_tail(&mut out, nullable, entries, references)?;
    trace!(entries = entries.len(), bytes = out.len(), "wrote array table");
    Ok(out)
}

pub fn read_table(nullable: bool, bytes: &[u8]) -> Result<Table, FormatError> {
    let mut reader = Reader::new(bytes);
    let inline = reader.u16()? as usize;
    let supers = reader.u16()? as usize;
    let count = inline + supers;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let slot = decode_slot(reader.u16()?)?;
        let segment_length = decode_segment_length(i, count, reader.u32()?)?;
        entries.push(TableEntry {
            slot,
            segment_length,
            marker: None,
            nullable: false,
        });
    }
    let (references, byte_length) = read_tail(&mut reader, nullable, &mut entries, supers)?;
    trace!(entries = count, bytes = byte_length, "read array table");
    Ok(Table {
        entries,
        references,
        byte_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{SlotTag, TypeTag};

    fn entry(slot: SlotTag, segments: Option<u32>) -> TableEntry {
        TableEntry {
            slot,
            segment_length: segments,
            marker: None,
            nullable: false,
        }
    }

    #[test]
    fn byte_layout() {
        let entries = vec![
            entry(TypeTag::Int32.into(), Some(1)),
            entry(TypeTag::String.into(), Some(2)),
        ];
        let bytes = write_table(false, &entries, &[]).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..4], &[0, 2, 0, 0]);
        assert_eq!(&bytes[4..10], &[0, 50, 0, 0, 0, 1]);
        assert_eq!(&bytes[10..16], &[0, 64, 0, 0, 0, 2]);
        assert!(bytes[16..].iter().all(|&b| b == 0));

        let table = read_table(false, &bytes).unwrap();
        assert_eq!(table.entries, entries);
        assert_eq!(table.byte_length, 32);
    }

    #[test]
    fn super_entries_carry_references_after_padding() {
        let mut second = entry(SlotTag::Super, Some(3));
        second.nullable = true;
        let entries = vec![entry(TypeTag::Boolean.into(), Some(1)), second];
        let reference = Reference::new([7; 32]);
        let bytes = write_table(true, &entries, &[reference]).unwrap();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[..4], &[0, 1, 0, 1]);
        assert_eq!(&bytes[10..12], &[0xff, 0xff]);
        assert_eq!(bytes[16], 0b10);
        assert_eq!(&bytes[32..], &[7; 32]);

        let table = read_table(true, &bytes).unwrap();
        assert_eq!(table.entries, entries);
        assert_eq!(table.references, vec![reference]);
        assert_eq!(table.byte_length, 64);
    }

    #[test]
    fn unknown_length_only_on_last_entry() {
        let entries = vec![entry(TypeTag::Int32.into(), Some(1)), entry(TypeTag::String.into(), None)];
        let bytes = write_table(false, &entries, &[]).unwrap();
        assert_eq!(read_table(false, &bytes).unwrap().entries, entries);

        let entries = vec![entry(TypeTag::String.into(), None), entry(TypeTag::Int32.into(), Some(1))];
        assert_eq!(
            write_table(false, &entries, &[]),
            Err(FormatError::MisplacedUnknownLength(0))
        );
    }

    #[test]
    fn truncated_and_malformed_tables() {
        assert_eq!(read_table(false, &[0, 1]), Err(FormatError::UnexpectedEof));
        let mut bytes = vec![0u8; 32];
        bytes[1] = 1;
        bytes[4..6].copy_from_slice(&999u16.to_be_bytes());
        assert_eq!(read_table(false, &bytes), Err(FormatError::UnknownTypeTag(999)));

        let entries = vec![entry(SlotTag::Super, Some(1))];
        assert!(write_table(false, &entries, &[]).is_err());
    }
}
