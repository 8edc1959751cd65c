//! Line extraction from a single section.
//!
//! Section content is treated as NUL-terminated text: anything from the first
//! NUL byte onward is ignored. The remaining bytes are split on `\n` the way a
//! tokenizer would, so runs of newlines never yield empty lines. The selected
//! line is returned byte-reversed.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use thiserror::Error;

use crate::header::{decode, DecodeError};
use crate::section::Section;

pub const LINE_DELIMITER: u8 = 0x0A;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid file: {0}")]
    File(#[from] DecodeError),
    #[error("invalid section {requested} (file has {available})")]
    Section { requested: usize, available: usize },
    #[error("invalid line {requested} (section has {available})")]
    Line { requested: usize, available: usize },
    #[error("failed to read section content: {0}")]
    Io(#[source] io::Error),
}

/// Reversed `line` of `section`, both 1-based, decoded as (lossy) UTF-8.
pub fn extract_line(path: impl AsRef<Path>, section: usize, line: usize) -> Result<String, ExtractError> {
    let bytes = extract_line_bytes(path, section, line)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reversed `line` of `section` as raw bytes.
///
/// Valid section numbers are `1..=sections.len()`.
pub fn extract_line_bytes(path: impl AsRef<Path>, section: usize, line: usize) -> Result<Vec<u8>, ExtractError> {
    let path = path.as_ref();
    let header = decode(path)?;

    let available = header.sections().len();
    let target = header
        .section(section)
        .ok_or(ExtractError::Section { requested: section, available })?;

    let content = read_section(path, target).map_err(ExtractError::Io)?;
    let mut selected = nth_line(&content, line)?.to_vec();
    selected.reverse();
    Ok(selected)
}

fn read_section(path: &Path, section: &Section) -> io::Result<Vec<u8>> {
    let range = section.range();
    let want = range.end - range.start;
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(range.start))?;
    // `size` is untrusted: grow the buffer with what is actually there.
    let mut buf = Vec::new();
    (&mut file).take(want).read_to_end(&mut buf)?;
    if (buf.len() as u64) < want {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("section declares {want} bytes, file holds {}", buf.len()),
        ));
    }
    Ok(buf)
}

/// Non-empty `\n`-separated tokens of `content`, cut at the first NUL.
pub fn lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let end = content.iter().position(|&b| b == 0).unwrap_or(content.len());
    content[..end]
        .split(|&b| b == LINE_DELIMITER)
        .filter(|token| !token.is_empty())
}

fn nth_line(content: &[u8], line: usize) -> Result<&[u8], ExtractError> {
    let index = line.checked_sub(1);
    let mut available = 0;
    for (i, token) in lines(content).enumerate() {
        if Some(i) == index {
            return Ok(token);
        }
        available += 1;
    }
    Err(ExtractError::Line { requested: line, available })
}
