//! Directory listing.
//!
//! The builder only ever looks one level deep at a time, so the reader
//! lists exactly one directory and reports what's directly inside it.

use crate::error::{MirrorError, Result};
use crate::node::{DirectoryEntry, EntryKind};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Source of directory listings.
pub trait DirectoryReader {
    /// Lists the entries directly inside `path`.
    ///
    /// Fails if `path` doesn't exist or can't be read. Callers decide
    /// whether that aborts anything; the reader never retries.
    fn list_entries(&self, path: &Path) -> Result<Vec<DirectoryEntry>>;
}

/// Reads listings from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryReader {
    /// Follow symbolic links instead of skipping them.
    pub follow_symlinks: bool,
}

impl FsDirectoryReader {
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

impl DirectoryReader for FsDirectoryReader {
    fn list_entries(&self, path: &Path) -> Result<Vec<DirectoryEntry>> {
        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(path).to_path_buf();
                MirrorError::io(at, e.into())
            })?;

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                // Unfollowed symlinks and special files.
                debug!("Skipping {}", entry.path().display());
                continue;
            };

            entries.push(DirectoryEntry::new(entry.into_path(), kind));
        }

        Ok(entries)
    }
}
