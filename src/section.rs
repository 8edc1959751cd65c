//! Section table entries.
//!
//! Every entry in the section table occupies 21 bytes, packed, little-endian:
//!
//! | Field  | Size | Notes                                        |
//! |--------|------|----------------------------------------------|
//! | name   | 12   | raw bytes, NUL padding optional              |
//! | type   | 1    | one of [`VALID_SECTION_TYPES`]               |
//! | offset | 4    | absolute byte offset of the section content  |
//! | size   | 4    | length of the section content in bytes       |

use byteorder::{LittleEndian, ReadBytesExt};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{self, Read};

pub const SECTION_NAME_SIZE:  usize = 12;
pub const SECTION_ENTRY_SIZE: usize = SECTION_NAME_SIZE + 1 + 4 + 4;

/// Section type bytes accepted by the decoder.
pub static VALID_SECTION_TYPES: [u8; 7] = [86, 60, 36, 22, 94, 90, 95];

// ── SectionName ──────────────────────────────────────────────────────────────

/// Fixed-width 12-byte section name.
///
/// The bytes are stored verbatim. Nothing guarantees a NUL terminator on disk;
/// [`SectionName::as_bytes`] stops at the first NUL if there is one, otherwise
/// it returns all twelve bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionName([u8; SECTION_NAME_SIZE]);

impl SectionName {
    pub fn from_raw(raw: [u8; SECTION_NAME_SIZE]) -> Self {
        Self(raw)
    }

    /// All twelve bytes exactly as read from disk.
    pub fn raw(&self) -> &[u8; SECTION_NAME_SIZE] {
        &self.0
    }

    /// The name up to (not including) the first NUL byte.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(SECTION_NAME_SIZE);
        &self.0[..end]
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Serialized as `{ "text": <display form>, "hex": <all twelve raw bytes> }`.
impl Serialize for SectionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("SectionName", 2)?;
        st.serialize_field("text", &self.to_string())?;
        st.serialize_field("hex", &hex::encode(self.0))?;
        st.end()
    }
}

// ── SectionType ──────────────────────────────────────────────────────────────

/// A section type byte that is known to be in [`VALID_SECTION_TYPES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SectionType(u8);

impl SectionType {
    #[inline]
    pub fn is_valid(raw: u8) -> bool {
        VALID_SECTION_TYPES.contains(&raw)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SectionType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        if Self::is_valid(raw) { Ok(Self(raw)) } else { Err(raw) }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Section ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name:         SectionName,
    pub section_type: SectionType,
    pub offset:       u32,
    pub size:         u32,
}

/// Outcome of reading one table entry: either a complete section or the
/// first offending type byte.
pub(crate) enum EntryRead {
    Section(Section),
    BadType(u8),
}

impl Section {
    /// Byte range of the section content within the file.
    pub fn range(&self) -> std::ops::Range<u64> {
        let start = self.offset as u64;
        start..start + self.size as u64
    }

    /// Read one 21-byte table entry.
    ///
    /// The type byte is checked as soon as it is read, so the offset and size
    /// of an entry with a bad type are never consumed.
    pub(crate) fn read<R: Read>(mut reader: R) -> io::Result<EntryRead> {
        let mut name = [0u8; SECTION_NAME_SIZE];
        reader.read_exact(&mut name)?;
        let section_type = match SectionType::try_from(reader.read_u8()?) {
            Ok(t)    => t,
            Err(raw) => return Ok(EntryRead::BadType(raw)),
        };
        let offset = reader.read_u32::<LittleEndian>()?;
        let size   = reader.read_u32::<LittleEndian>()?;
        Ok(EntryRead::Section(Section {
            name: SectionName::from_raw(name),
            section_type,
            offset,
            size,
        }))
    }
}
