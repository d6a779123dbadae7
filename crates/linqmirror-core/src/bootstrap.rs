//! First-time population of a mirror.
//!
//! The builder never creates folders; this is the one place that does.
//! For every allow-listed directory of the layout that the project has no
//! folder for, a folder is added, and then a regular build fills them.

use crate::builder::{BuildSummary, TreeBuilder};
use crate::error::{MirrorError, Result};
use crate::filter::EntryFilter;
use crate::node::TreeNode;
use crate::path::require_absolute;
use crate::reader::DirectoryReader;
use crate::sink::ProjectMirrorSink;
use std::path::Path;
use tracing::info;

/// Creates missing project folders for allow-listed directories under
/// `root_path`, then builds the mirror.
///
/// Fails with `NotFound` if `root_path` isn't a directory, before the
/// project is touched, and with `RelativeRoot` for a relative root.
/// Running it again adds no folders.
pub fn bootstrap_mirror<R, S>(
    root_path: &Path,
    root: &mut TreeNode,
    sink: &mut S,
    reader: &R,
    filter: &EntryFilter,
) -> Result<BuildSummary>
where
    R: DirectoryReader + ?Sized,
    S: ProjectMirrorSink + ?Sized,
{
    require_absolute(root_path)?;
    if !root_path.is_dir() {
        return Err(MirrorError::not_found("LINQPad directory", root_path));
    }

    let mut folders_created = 0;
    for entry in reader.list_entries(root_path)? {
        if !entry.is_dir() || !filter.accepts_folder(&entry.full_path) {
            continue;
        }
        if root.child_folder_position(&entry.full_path).is_some()
            || sink.find_child_by_path(root.handle, &entry.full_path).is_some()
        {
            continue;
        }

        let handle = sink.add_folder(root.handle, &entry.name)?;
        root.push_child(TreeNode::folder(&entry.name, &entry.full_path, handle));
        folders_created += 1;
    }

    if folders_created > 0 {
        info!("Created {} mirror folders", folders_created);
    }

    TreeBuilder::new(reader, filter).build(root_path, root, sink)
}
