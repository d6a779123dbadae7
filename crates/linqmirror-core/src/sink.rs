//! The project side of the mirror.
//!
//! A ProjectMirrorSink is whatever holds the project tree we mirror into:
//! an IDE's solution model, a project file, or [`MemoryProject`](crate::MemoryProject).
//! Mirror operations "materialize" entries by calling into it.

use crate::error::Result;
use crate::node::ItemHandle;
use crate::path::same_path;
use std::path::{Path, PathBuf};

/// Trait for project trees the mirror can write into.
///
/// Implementations don't need to be thread-safe; all calls for one
/// mirror come from a single owner.
pub trait ProjectMirrorSink {
    /// The top-level mirror folder.
    fn root_handle(&self) -> ItemHandle;

    /// Direct children of an item, in project order. Unknown handles and
    /// files have none.
    fn children(&self, parent: ItemHandle) -> Vec<ItemHandle>;

    /// The filesystem path an item mirrors, if the item carries one.
    ///
    /// Folder paths may come back with a trailing separator.
    fn full_path(&self, item: ItemHandle) -> Option<PathBuf>;

    /// Looks up a direct child of `parent` that mirrors `full_path`.
    fn find_child_by_path(&self, parent: ItemHandle, full_path: &Path) -> Option<ItemHandle> {
        self.children(parent).into_iter().find(|&child| {
            self.full_path(child)
                .is_some_and(|p| same_path(&p, full_path))
        })
    }

    /// Adds a file as a child of a folder.
    ///
    /// Fails if the file can't be read or `parent` isn't a folder.
    fn add_file(&mut self, parent: ItemHandle, full_path: &Path) -> Result<ItemHandle>;

    /// Adds a folder named `name` under `parent`.
    fn add_folder(&mut self, parent: ItemHandle, name: &str) -> Result<ItemHandle>;
}
