//! Full resync of the mirror from a directory snapshot.
//!
//! The builder looks at the mirror root directory, mirrors the files it
//! finds there, and descends exactly once into allow-listed folders that
//! the project already has. That second level is a flat file-only pass.

use crate::error::Result;
use crate::filter::EntryFilter;
use crate::node::{DirectoryEntry, TreeNode};
use crate::path::require_absolute;
use crate::reader::DirectoryReader;
use crate::sink::ProjectMirrorSink;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// What a build did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Files newly materialized in the project.
    pub files_added: usize,

    /// Files the project already had (in the tree or in the sink).
    pub files_existing: usize,

    /// Allow-listed folders that had a project folder and were filled.
    pub folders_mirrored: usize,

    /// Allow-listed folders skipped because the project has no folder
    /// for them.
    pub folders_missing: usize,

    /// Entries rejected by the filter.
    pub entries_ignored: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Mirrors a directory snapshot into a tree and its project.
pub struct TreeBuilder<'a, R: DirectoryReader + ?Sized> {
    reader: &'a R,
    filter: &'a EntryFilter,
}

impl<'a, R: DirectoryReader + ?Sized> TreeBuilder<'a, R> {
    pub fn new(reader: &'a R, filter: &'a EntryFilter) -> Self {
        Self { reader, filter }
    }

    /// Mirrors `root_path` into `root`.
    ///
    /// `root` must be the folder node mirroring `root_path`; that isn't
    /// checked. A relative `root_path` fails with `RelativeRoot`. Folders are never created here: an allow-listed directory
    /// is only filled when `root` or the sink already has a folder for it.
    ///
    /// A file counts as added only once the sink accepted it. Errors from
    /// the reader or the sink are returned as-is, leaving whatever was
    /// mirrored so far in place.
    pub fn build<S: ProjectMirrorSink + ?Sized>(
        &self,
        root_path: &Path,
        root: &mut TreeNode,
        sink: &mut S,
    ) -> Result<BuildSummary> {
        require_absolute(root_path)?;
        let start = Instant::now();
        let mut summary = BuildSummary::default();

        info!("Mirroring {}", root_path.display());

        for entry in self.reader.list_entries(root_path)? {
            if !entry.is_dir() {
                self.mirror_file(&entry, root, sink, &mut summary)?;
                continue;
            }

            if !self.filter.accepts_folder(&entry.full_path) {
                debug!("Skipping folder {}", entry.full_path.display());
                summary.entries_ignored += 1;
                continue;
            }

            let Some(folder) = resolve_folder(root, &entry, &*sink) else {
                debug!("No project folder for {}", entry.full_path.display());
                summary.folders_missing += 1;
                continue;
            };

            // Flat pass: subdirectories below an allow-listed folder are
            // not mirrored.
            for child in self.reader.list_entries(&entry.full_path)? {
                if child.is_dir() {
                    continue;
                }
                self.mirror_file(&child, folder, sink, &mut summary)?;
            }
            summary.folders_mirrored += 1;
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Mirrored {} new files ({} already present, {} folders) in {}ms",
            summary.files_added, summary.files_existing, summary.folders_mirrored, summary.duration_ms
        );

        Ok(summary)
    }

    fn mirror_file<S: ProjectMirrorSink + ?Sized>(
        &self,
        entry: &DirectoryEntry,
        folder: &mut TreeNode,
        sink: &mut S,
        summary: &mut BuildSummary,
    ) -> Result<()> {
        let path = &entry.full_path;
        if !self.filter.accepts_file(path) {
            summary.entries_ignored += 1;
            return Ok(());
        }

        if folder.has_file(path) {
            summary.files_existing += 1;
            return Ok(());
        }

        if let Some(handle) = sink.find_child_by_path(folder.handle, path) {
            folder.push_child(TreeNode::file(path, handle));
            summary.files_existing += 1;
            return Ok(());
        }

        let handle = sink.add_file(folder.handle, path)?;
        folder.push_child(TreeNode::file(path, handle));
        summary.files_added += 1;
        debug!("Mirrored {}", path.display());
        Ok(())
    }
}

/// Finds the folder node for an allow-listed directory: a child of `root`
/// first, then a folder the sink has that the tree doesn't know yet.
fn resolve_folder<'n, S: ProjectMirrorSink + ?Sized>(
    root: &'n mut TreeNode,
    entry: &DirectoryEntry,
    sink: &S,
) -> Option<&'n mut TreeNode> {
    let index = match root.child_folder_position(&entry.full_path) {
        Some(index) => index,
        None => {
            let handle = sink.find_child_by_path(root.handle, &entry.full_path)?;
            root.push_child(TreeNode::folder(&entry.name, &entry.full_path, handle));
            root.children.len() - 1
        }
    };
    root.children.get_mut(index)
}
