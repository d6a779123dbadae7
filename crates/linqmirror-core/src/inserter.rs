//! Incremental updates from filesystem notifications.
//!
//! Each created file adds at most one leaf. There is no rebuild and no
//! duplicate check: the same creation reported twice is mirrored twice.
//! Deletions are accepted and ignored; mirrored files stay in the project
//! after they disappear from disk.

use crate::error::Result;
use crate::filter::EntryFilter;
use crate::node::{ItemHandle, TreeNode};
use crate::sink::ProjectMirrorSink;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a created file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The file didn't pass the filter. Nothing changed.
    Ignored,

    /// Added under the folder mirroring the file's parent directory.
    Attached { folder: PathBuf, handle: ItemHandle },

    /// No folder mirrors the parent directory, so the file went to the root.
    AtRoot { handle: ItemHandle },
}

impl Insertion {
    pub fn handle(&self) -> Option<ItemHandle> {
        match self {
            Self::Ignored => None,
            Self::Attached { handle, .. } | Self::AtRoot { handle } => Some(*handle),
        }
    }
}

/// Applies single creation/deletion events to a mirror.
pub struct IncrementalInserter<'a> {
    filter: &'a EntryFilter,
}

impl<'a> IncrementalInserter<'a> {
    pub fn new(filter: &'a EntryFilter) -> Self {
        Self { filter }
    }

    /// Mirrors a newly created file.
    ///
    /// The destination is the folder node whose path is the file's parent
    /// directory, searched anywhere in the tree; failing that, the root.
    /// Sink errors are returned unchanged and leave the tree untouched.
    pub fn insert_created<S: ProjectMirrorSink + ?Sized>(
        &self,
        path: &Path,
        root: &mut TreeNode,
        sink: &mut S,
    ) -> Result<Insertion> {
        if !self.filter.accepts_file(path) {
            debug!("Ignoring created {}", path.display());
            return Ok(Insertion::Ignored);
        }

        let destination = match path.parent() {
            Some(parent) => root.find_folder_mut(parent),
            None => None,
        };

        if let Some(folder) = destination {
            let handle = sink.add_file(folder.handle, path)?;
            folder.push_child(TreeNode::file(path, handle));
            debug!("Attached {} under {}", path.display(), folder.name);
            return Ok(Insertion::Attached {
                folder: folder.full_path.clone(),
                handle,
            });
        }

        let handle = sink.add_file(root.handle, path)?;
        root.push_child(TreeNode::file(path, handle));
        debug!("Attached {} at mirror root", path.display());
        Ok(Insertion::AtRoot { handle })
    }

    /// Handles a deleted path. Never touches the tree or the project.
    pub fn remove_deleted(&self, path: &Path, _root: &TreeNode) {
        debug!("Ignoring deleted {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemoryProject;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_ignored_extension_is_noop() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "").unwrap();

        let mut project = MemoryProject::new("LINQPad", dir.path());
        let mut tree = project.mirror_tree();
        let filter = EntryFilter::default();

        let result = IncrementalInserter::new(&filter)
            .insert_created(&file, &mut tree, &mut project)
            .unwrap();
        assert_eq!(result, Insertion::Ignored);
        assert!(tree.children.is_empty());
        assert_eq!(project.len(), 1);
    }

    #[test]
    fn test_file_in_root_directory_attaches_to_root_folder() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("ConnectionsV2.xml");
        fs::write(&file, "").unwrap();

        let mut project = MemoryProject::new("LINQPad", dir.path());
        let mut tree = project.mirror_tree();
        let filter = EntryFilter::default();

        let result = IncrementalInserter::new(&filter)
            .insert_created(&file, &mut tree, &mut project)
            .unwrap();
        assert!(matches!(result, Insertion::Attached { ref folder, .. } if folder == dir.path()));
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn test_sink_error_leaves_tree_untouched() {
        let dir = tempdir().unwrap();
        // Never written to disk, so the sink can't read it.
        let file = dir.path().join("ghost.linq");

        let mut project = MemoryProject::new("LINQPad", dir.path());
        let mut tree = project.mirror_tree();
        let filter = EntryFilter::default();

        let result = IncrementalInserter::new(&filter).insert_created(&file, &mut tree, &mut project);
        assert!(result.is_err());
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_remove_deleted_leaves_tree_alone() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.linq");
        fs::write(&file, "").unwrap();

        let mut project = MemoryProject::new("LINQPad", dir.path());
        let mut tree = project.mirror_tree();
        let filter = EntryFilter::default();
        let inserter = IncrementalInserter::new(&filter);
        inserter.insert_created(&file, &mut tree, &mut project).unwrap();

        let before = tree.clone();
        fs::remove_file(&file).unwrap();
        inserter.remove_deleted(&file, &tree);
        inserter.remove_deleted(&dir.path().join("never-existed.linq"), &tree);
        assert_eq!(tree, before);
        assert_eq!(project.len(), 2);
    }
}
