//! Plain directory listing with name-prefix and owner-write filters.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::walk::{strip_cur_dir, TreeWalk, WalkEntry};

#[derive(Error, Debug)]
pub enum ListError {
    #[error("invalid directory path {}: {source}", path.display())]
    InvalidRoot {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub recursive:     bool,
    /// Keep only entries whose owner has write permission.
    pub writable_only: bool,
    /// Keep only entries whose file name starts with this string.
    pub name_prefix:   Option<String>,
}

impl ListOptions {
    fn accepts(&self, entry: &WalkEntry) -> bool {
        if self.writable_only && !owner_writable(&entry.path) {
            return false;
        }
        match self.name_prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => entry
                .file_name()
                .map(|n| n.to_string_lossy().starts_with(prefix))
                .unwrap_or(false),
            None => true,
        }
    }
}

#[cfg(unix)]
fn owner_writable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::symlink_metadata(path)
        .map(|m| m.permissions().mode() & 0o200 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn owner_writable(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// Lazily list the entries of `root` (and, if recursive, of every directory
/// below it, in pre-order) that pass the filters in `opts`.
pub fn list(root: impl AsRef<Path>, opts: ListOptions) -> Result<impl Iterator<Item = PathBuf>, ListError> {
    let root = root.as_ref();
    let walk = TreeWalk::new(root, opts.recursive).map_err(|source| ListError::InvalidRoot {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(walk
        .filter(move |entry| opts.accepts(entry))
        .map(|entry| strip_cur_dir(&entry.path).to_path_buf()))
}
