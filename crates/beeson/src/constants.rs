/// Alignment unit of every schema and payload section.
pub const SEGMENT_SIZE: usize = 32;

/// Byte length of the blob header (version magic, padding, type code).
pub const HEADER_BYTE_LENGTH: usize = 32;

/// Byte length of a schema reference.
pub const REFERENCE_LENGTH: usize = 32;

/// Array descriptor entry: 2-byte type code + 4-byte segment length.
pub const ARRAY_ENTRY_LENGTH: usize = 6;

/// Object descriptor entry: 2-byte type code + 4-byte segment length +
/// 2-byte marker length.
pub const OBJECT_ENTRY_LENGTH: usize = 8;

/// Type code marking a slot whose schema is stored out of band.
pub const SUPER_TYPE_CODE: u16 = 0xffff;

/// Segment length value meaning "the rest of the slice".
pub const UNKNOWN_SEGMENT_LENGTH: u32 = u32::MAX;

/// First version byte of every BeeSon header.
pub const BEESON_HEADER_ID: u8 = 1;

/// Zero bytes between the version magic and the type code.
pub const HEADER_PADDING: usize = HEADER_BYTE_LENGTH - 4 - 2;

/// Terminator appended to encoded strings.
pub const STRING_TERMINATOR: u8 = b'"';

/// BeeSon format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    #[default]
    V0_1_0,
}

impl Version {
    /// Header magic: header id followed by the semver triple.
    pub const fn magic(self) -> [u8; 4] {
        match self {
            Version::V0_1_0 => [BEESON_HEADER_ID, 0, 1, 0],
        }
    }

    pub fn from_magic(bytes: [u8; 4]) -> Option<Self> {
        if bytes == Version::V0_1_0.magic() {
            Some(Version::V0_1_0)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Version::V0_1_0 => "0.1.0",
        }
    }
}
