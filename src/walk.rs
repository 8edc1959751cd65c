//! Lazy pre-order directory walk.
//!
//! Every entry of a directory is yielded before any of its subdirectories is
//! entered; subdirectories are then visited depth-first in the order they were
//! read. Each directory is read with a single-level `WalkDir`, so only one
//! directory handle is open at a time: subdirectories waiting to be visited
//! are kept as paths on an explicit stack.
//!
//! Directories are recognised without following symlinks, so a symlink to a
//! directory is yielded as an entry but never descended into.

use std::fs::{self, FileType};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path:      PathBuf,
    /// Type of the entry itself (symlinks not followed).
    pub file_type: FileType,
}

impl WalkEntry {
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories_visited:    usize,
    pub unreadable_directories: usize,
}

/// One directory being read: a single-level `WalkDir` plus the first entry,
/// pulled eagerly so an unreadable directory is detected on open.
struct OpenDir {
    entries:   walkdir::IntoIter,
    lookahead: Option<walkdir::DirEntry>,
    subdirs:   Vec<PathBuf>,
}

impl OpenDir {
    fn open(dir: &Path) -> Result<Self, walkdir::Error> {
        let mut entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter();
        let lookahead = match entries.next() {
            Some(Err(e)) if e.depth() == 0 => return Err(e),
            Some(Err(e)) => {
                log::warn!("skipping unreadable entry: {e}");
                None
            }
            Some(Ok(entry)) => Some(entry),
            None => None,
        };
        Ok(Self { entries, lookahead, subdirs: Vec::new() })
    }

    fn next_entry(&mut self) -> Option<walkdir::Result<walkdir::DirEntry>> {
        match self.lookahead.take() {
            Some(entry) => Some(Ok(entry)),
            None        => self.entries.next(),
        }
    }
}

pub struct TreeWalk {
    recursive: bool,
    current:   Option<OpenDir>,
    pending:   Vec<PathBuf>,
    stats:     WalkStats,
}

impl TreeWalk {
    /// Open `root` for walking. Failure to read `root` itself is the only
    /// error a walk ever reports; later failures are logged and skipped.
    pub fn new(root: impl AsRef<Path>, recursive: bool) -> io::Result<Self> {
        let root = root.as_ref();
        if !fs::metadata(root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is not a directory", root.display()),
            ));
        }
        let current = OpenDir::open(root)?;
        Ok(Self {
            recursive,
            current: Some(current),
            pending: Vec::new(),
            stats:   WalkStats { directories_visited: 1, unreadable_directories: 0 },
        })
    }

    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    fn enter_next_pending(&mut self) -> bool {
        while let Some(dir) = self.pending.pop() {
            match OpenDir::open(&dir) {
                Ok(open) => {
                    self.stats.directories_visited += 1;
                    self.current = Some(open);
                    return true;
                }
                Err(e) => {
                    self.stats.unreadable_directories += 1;
                    log::warn!("skipping unreadable directory {}: {e}", dir.display());
                }
            }
        }
        false
    }
}

impl Iterator for TreeWalk {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        loop {
            let Some(open) = self.current.as_mut() else {
                if !self.enter_next_pending() {
                    return None;
                }
                continue;
            };

            match open.next_entry() {
                Some(Ok(entry)) => {
                    let file_type = entry.file_type();
                    let path = entry.into_path();
                    if self.recursive && file_type.is_dir() {
                        open.subdirs.push(path.clone());
                    }
                    return Some(WalkEntry { path, file_type });
                }
                Some(Err(e)) => {
                    log::warn!("skipping unreadable entry: {e}");
                }
                None => {
                    // Reverse so the first subdirectory read is the first popped.
                    if let Some(done) = self.current.take() {
                        self.pending.extend(done.subdirs.into_iter().rev());
                    }
                }
            }
        }
    }
}

/// Drop a leading `./` component, if any.
pub fn strip_cur_dir(path: &Path) -> &Path {
    let mut components = path.components();
    match components.next() {
        Some(Component::CurDir) => components.as_path(),
        _ => path,
    }
}
