//! Solution layout provisioning.
//!
//! Puts a LINQPad installation next to a solution: the `LinqPad`
//! directory with its `drivers`, `plugins`, `Queries` and `snippets`
//! subfolders, an empty connections file, and a copy of the LINQPad
//! distribution. Everything is create-if-absent; nothing is overwritten.

use crate::error::{MirrorError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the LINQPad connections file.
pub const CONNECTIONS_FILE: &str = "ConnectionsV2.xml";

/// Contents written to a fresh connections file.
pub const EMPTY_CONNECTIONS: &str =
    "<?xml version=\"1.0\" encoding=\"utf-8\"?><Connections></Connections>";

/// Where a LINQPad installation lives inside a solution directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionLayout {
    root: PathBuf,
    subfolders: Vec<String>,
}

/// What [`SolutionLayout::provision`] changed on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Directories that didn't exist before.
    pub directories_created: Vec<PathBuf>,

    /// Whether the connections file was written.
    pub connections_written: bool,

    /// Distribution files copied into the layout.
    pub files_copied: Vec<PathBuf>,
}

impl SolutionLayout {
    /// A layout rooted at `solution_dir/dir_name`.
    pub fn new<I>(solution_dir: &Path, dir_name: &str, subfolders: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            root: solution_dir.join(dir_name),
            subfolders: subfolders.into_iter().map(Into::into).collect(),
        }
    }

    /// The LINQPad directory. This is the path the mirror root mirrors.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subfolder_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.subfolders.iter().map(|name| self.root.join(name))
    }

    pub fn connections_path(&self) -> PathBuf {
        self.root.join(CONNECTIONS_FILE)
    }

    /// Whether the LINQPad directory exists.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Creates the LINQPad directory and its subfolders. Returns the ones
    /// that were missing.
    pub fn ensure_directories(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for dir in std::iter::once(self.root.clone()).chain(self.subfolder_paths()) {
            if dir.is_dir() {
                continue;
            }
            fs::create_dir_all(&dir).map_err(|e| MirrorError::io(&dir, e))?;
            debug!("Created {}", dir.display());
            created.push(dir);
        }
        Ok(created)
    }

    /// Writes an empty connections file unless one exists.
    pub fn ensure_connections_file(&self) -> Result<bool> {
        let dest = self.connections_path();
        if dest.exists() {
            return Ok(false);
        }
        fs::write(&dest, EMPTY_CONNECTIONS).map_err(|e| MirrorError::io(&dest, e))?;
        debug!("Wrote {}", dest.display());
        Ok(true)
    }

    /// Copies the named distribution files from `source_dir` into the
    /// layout, skipping ones already present.
    ///
    /// Every source file is checked before anything is copied, so a
    /// missing file leaves the layout as it was.
    pub fn ensure_distribution<S: AsRef<str>>(
        &self,
        source_dir: &Path,
        files: &[S],
    ) -> Result<Vec<PathBuf>> {
        for name in files {
            let src = source_dir.join(name.as_ref());
            if !src.is_file() {
                return Err(MirrorError::not_found("LINQPad distribution file", src));
            }
        }

        let mut copied = Vec::new();
        for name in files {
            let src = source_dir.join(name.as_ref());
            let dest = self.root.join(name.as_ref());
            if dest.exists() {
                continue;
            }
            fs::copy(&src, &dest).map_err(|e| MirrorError::io(&dest, e))?;
            debug!("Copied {} -> {}", src.display(), dest.display());
            copied.push(dest);
        }
        Ok(copied)
    }

    /// Runs all provisioning steps. Pass `None` to skip the distribution.
    pub fn provision<S: AsRef<str>>(
        &self,
        distribution: Option<(&Path, &[S])>,
    ) -> Result<ProvisionReport> {
        let directories_created = self.ensure_directories()?;
        let connections_written = self.ensure_connections_file()?;
        let files_copied = match distribution {
            Some((source_dir, files)) => self.ensure_distribution(source_dir, files)?,
            None => Vec::new(),
        };

        info!(
            "Provisioned {} ({} dirs created, {} files copied)",
            self.root.display(),
            directories_created.len(),
            files_copied.len()
        );

        Ok(ProvisionReport {
            directories_created,
            connections_written,
            files_copied,
        })
    }
}
