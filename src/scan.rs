//! SF-file finder: walk a tree and yield every container whose sections are
//! all small enough.
//!
//! # How it works
//!
//! The walk is the pre-order [`TreeWalk`]: a directory's own matches come out
//! before anything from its subdirectories. Every non-directory entry is handed
//! to the decoder; a decode failure of any kind simply means "does not
//! conform" and never stops the walk. The only error a scan reports is failing
//! to open the root.
//!
//! ## Counters
//!
//! [`ConformingFiles::stats`] exposes running counts:
//! - `files_examined`: non-directory entries handed to the decoder
//! - `conforming`: paths yielded
//! - `not_containers`: decode failed
//! - `oversized`: decoded, but some section is over the limit

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::header::{decode_with, DecodeOptions};
use crate::walk::{strip_cur_dir, TreeWalk};

/// Largest section size, in bytes, an SF file may have.
pub const SF_MAX_SECTION_SIZE: u32 = 1036;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid directory path {}: {source}", path.display())]
    InvalidRoot {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_section_size: u32,
    pub decode:           DecodeOptions,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_section_size: SF_MAX_SECTION_SIZE,
            decode:           DecodeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub directories_visited:    usize,
    pub unreadable_directories: usize,
    pub files_examined:         usize,
    pub conforming:             usize,
    pub not_containers:         usize,
    pub oversized:              usize,
}

impl ScanStats {
    /// Summary line for display.
    pub fn summary(&self) -> String {
        format!(
            "{} SF file(s) in {} file(s) across {} director(ies); \
             {} not containers, {} oversized, {} unreadable director(ies)",
            self.conforming,
            self.files_examined,
            self.directories_visited,
            self.not_containers,
            self.oversized,
            self.unreadable_directories,
        )
    }
}

/// Lazy sequence of SF-file paths under a root.
pub struct ConformingFiles {
    walk:  TreeWalk,
    opts:  ScanOptions,
    stats: ScanStats,
    done:  bool,
}

impl ConformingFiles {
    /// Counters so far; complete once the iterator has returned `None`.
    pub fn stats(&self) -> ScanStats {
        let walk = self.walk.stats();
        ScanStats {
            directories_visited:    walk.directories_visited,
            unreadable_directories: walk.unreadable_directories,
            ..self.stats.clone()
        }
    }

    fn conforms(&mut self, path: &Path) -> bool {
        self.stats.files_examined += 1;
        match decode_with(path, &self.opts.decode) {
            Ok(header) if header.sections_within(self.opts.max_section_size) => {
                self.stats.conforming += 1;
                true
            }
            Ok(_) => {
                self.stats.oversized += 1;
                false
            }
            Err(_) => {
                self.stats.not_containers += 1;
                false
            }
        }
    }
}

impl Iterator for ConformingFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        while let Some(entry) = self.walk.next() {
            if entry.file_type.is_dir() {
                continue;
            }
            if self.conforms(&entry.path) {
                return Some(strip_cur_dir(&entry.path).to_path_buf());
            }
        }
        if !self.done {
            self.done = true;
            log::info!("{}", self.stats().summary());
        }
        None
    }
}

/// Recursively find SF files under `root` (sections ≤ [`SF_MAX_SECTION_SIZE`]).
pub fn scan(root: impl AsRef<Path>) -> Result<ConformingFiles, ScanError> {
    scan_with(root, ScanOptions::default())
}

pub fn scan_with(root: impl AsRef<Path>, opts: ScanOptions) -> Result<ConformingFiles, ScanError> {
    let root = root.as_ref();
    let walk = TreeWalk::new(root, true).map_err(|source| ScanError::InvalidRoot {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(ConformingFiles { walk, opts, stats: ScanStats::default(), done: false })
}
