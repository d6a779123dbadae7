//! Error types for the mirror.
//!
//! Only real failures live here. Entries that simply don't match the
//! allow-lists are not errors; they show up as skips in a
//! [`BuildSummary`](crate::BuildSummary) or as
//! [`Insertion::Ignored`](crate::Insertion::Ignored).

use crate::node::ItemHandle;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for fallible mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Things that can go wrong while provisioning or mirroring.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Something we depend on is missing: the LINQPad folder, the mirror
    /// folder in the project, or a file of the LINQPad distribution.
    /// Aborts the whole operation before anything gets mirrored.
    #[error("{what} not found: '{path}'")]
    NotFound { what: String, path: PathBuf },

    /// A directory couldn't be listed or a file couldn't be read, written
    /// or copied.
    #[error("filesystem access failed for '{path}': {source}")]
    FilesystemAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project sink was handed a parent it doesn't know about, or one
    /// that can't hold children.
    #[error("invalid project item handle {0}")]
    InvalidHandle(ItemHandle),

    /// The persisted project file exists but can't be used.
    #[error("invalid project file '{path}': {message}")]
    Project { path: PathBuf, message: String },

    /// A mirror root was given as a relative path. Mirror paths are
    /// identity keys and must be absolute.
    #[error("mirror root '{0}' is not an absolute path")]
    RelativeRoot(PathBuf),

    /// The config file exists but can't be parsed.
    #[error("invalid config file '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl MirrorError {
    /// Creates a filesystem error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemAccess {
            path: path.into(),
            source,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// True for errors that should stop a top-level operation outright
    /// rather than be reported and skipped.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
