//! Path normalization.
//!
//! Project systems like to report folder paths with a trailing
//! separator while the filesystem never does. Everything that compares
//! a mirror path against a filesystem path goes through here.

use crate::error::{MirrorError, Result};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Rebuilds a path from its components, dropping trailing separators
/// and interior `.` segments.
pub fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Compares two paths after normalization.
///
/// Windows filesystems are case-insensitive, so the comparison is too.
pub fn same_path(a: &Path, b: &Path) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if cfg!(windows) {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    } else {
        a == b
    }
}

/// Renders a folder path the way project systems store it: with exactly
/// one trailing separator.
pub fn folder_path_string(path: &Path) -> String {
    let mut s = normalize(path).to_string_lossy().into_owned();
    if !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}

/// Resolves an existing directory to its canonical absolute form, without
/// the verbatim prefix Windows would otherwise add.
pub fn canonical_dir(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|e| MirrorError::io(path, e))
}

/// Fails with `RelativeRoot` unless `path` is absolute.
pub fn require_absolute(path: &Path) -> Result<()> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(MirrorError::RelativeRoot(path.to_path_buf()))
    }
}

/// The display name of an entry: its last component, or the whole path
/// when there is none (e.g. a filesystem root).
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
