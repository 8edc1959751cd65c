//! Trailer-anchored container header.
//!
//! The header sits at the very end of the file and is located by seeking
//! backward from EOF:
//!
//! ```text
//! file_end - header_size
//! │
//! ▼
//! version:4 | section_count:1 | section[count] (21 B each) | header_size:2 | magic:2 = "Vu"
//!                                                           ▲               ▲
//!                                                           file_end - 4    file_end - 2
//! ```
//!
//! All multi-byte fields are little-endian and packed without padding.
//! `header_size` counts itself and the magic.
//!
//! Checks run in a fixed order (magic, version, section count, then each
//! section's type) and the first failure is the one reported. Sections are
//! collected into a local buffer; a [`ContainerHeader`] is only built once every
//! entry has been read and validated.

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::section::{EntryRead, Section, SECTION_ENTRY_SIZE};

pub const MAGIC: &[u8; 2] = b"Vu";
pub const MAGIC_SIZE:       usize = 2;
pub const HEADER_SIZE_SIZE: usize = 2;
pub const VERSION_RANGE:       RangeInclusive<i32> = 54..=126;
pub const SECTION_COUNT_RANGE: RangeInclusive<u8>  = 2..=12;

/// Bytes of header that do not depend on the section count:
/// version, section_count, header_size and magic.
pub const FIXED_HEADER_BYTES: usize = 4 + 1 + HEADER_SIZE_SIZE + MAGIC_SIZE;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("not a regular file: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("wrong magic (found 0x{})", hex::encode(.0))]
    BadMagic([u8; MAGIC_SIZE]),
    #[error("wrong version: {0} (expected 54..=126)")]
    BadVersion(i32),
    #[error("wrong section count: {0} (expected 2..=12)")]
    BadSectionCount(u8),
    #[error("header_size {declared} does not match {expected} bytes implied by the section table")]
    InconsistentHeaderSize { declared: u16, expected: usize },
    #[error("wrong type {section_type} for section {index}")]
    BadSectionType { index: usize, section_type: u8 },
}

/// Decoder knobs. The default trusts `header_size` as written.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Reject files whose `header_size` differs from the size implied by the
    /// section count.
    pub verify_header_size: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerHeader {
    #[serde(skip)]
    magic:       [u8; MAGIC_SIZE],
    header_size: u16,
    version:     i32,
    sections:    Vec<Section>,
}

impl ContainerHeader {
    pub fn magic(&self) -> &[u8; MAGIC_SIZE] {
        &self.magic
    }

    pub fn header_size(&self) -> u16 {
        self.header_size
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section by 1-based table position.
    pub fn section(&self, number: usize) -> Option<&Section> {
        number.checked_sub(1).and_then(|i| self.sections.get(i))
    }

    /// True when every section is at most `limit` bytes long.
    pub fn sections_within(&self, limit: u32) -> bool {
        self.sections.iter().all(|s| s.size <= limit)
    }

    /// Header length implied by a table of `count` sections.
    pub fn expected_size(count: u8) -> usize {
        FIXED_HEADER_BYTES + count as usize * SECTION_ENTRY_SIZE
    }

    /// Decode the header from a seekable stream. The stream position on return
    /// is unspecified.
    pub fn read<R: Read + Seek>(mut reader: R, opts: &DecodeOptions) -> Result<Self, DecodeError> {
        reader.seek(SeekFrom::End(-(MAGIC_SIZE as i64)))?;
        let mut magic = [0u8; MAGIC_SIZE];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }

        reader.seek(SeekFrom::End(-((MAGIC_SIZE + HEADER_SIZE_SIZE) as i64)))?;
        let header_size = reader.read_u16::<LittleEndian>()?;

        reader.seek(SeekFrom::End(-(header_size as i64)))?;
        let version = reader.read_i32::<LittleEndian>()?;
        if !VERSION_RANGE.contains(&version) {
            return Err(DecodeError::BadVersion(version));
        }

        let count = reader.read_u8()?;
        if !SECTION_COUNT_RANGE.contains(&count) {
            return Err(DecodeError::BadSectionCount(count));
        }

        if opts.verify_header_size {
            let expected = Self::expected_size(count);
            if header_size as usize != expected {
                return Err(DecodeError::InconsistentHeaderSize { declared: header_size, expected });
            }
        }

        let mut sections = Vec::with_capacity(count as usize);
        for index in 0..count as usize {
            match Section::read(&mut reader)? {
                EntryRead::Section(s) => sections.push(s),
                EntryRead::BadType(section_type) => {
                    return Err(DecodeError::BadSectionType { index, section_type });
                }
            }
        }

        Ok(Self { magic, header_size, version, sections })
    }
}

/// Decode the container at `path` with default options.
pub fn decode(path: impl AsRef<Path>) -> Result<ContainerHeader, DecodeError> {
    decode_with(path, &DecodeOptions::default())
}

/// Decode the container at `path`.
///
/// `path` must resolve (following symlinks) to a regular file; anything else,
/// including a path that cannot be stat'ed, is [`DecodeError::InvalidPath`].
pub fn decode_with(path: impl AsRef<Path>, opts: &DecodeOptions) -> Result<ContainerHeader, DecodeError> {
    let path = path.as_ref();
    let is_file = std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Err(DecodeError::InvalidPath(path.to_path_buf()));
    }
    let file = File::open(path)?;
    ContainerHeader::read(BufReader::new(file), opts).map_err(|e| {
        log::debug!("{}: {e}", path.display());
        e
    })
}
