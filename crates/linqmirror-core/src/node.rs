//! Mirror tree representation.
//!
//! A TreeNode is the in-memory picture of one item in the project tree:
//! which filesystem entry it mirrors and which project item it was
//! materialized as. The tree is only ever as deep as the layout allows
//! (root, allow-listed folders, their files), but nothing here assumes that.

use crate::path::{display_name, same_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Opaque identifier of an item inside a [`ProjectMirrorSink`](crate::ProjectMirrorSink).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemHandle(u32);

impl ItemHandle {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a mirror node is a leaf or a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Folder,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::File => "file",
            Self::Folder => "folder",
        };
        write!(f, "{}", s)
    }
}

/// Kind of a filesystem entry as reported by a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing. Owned by whoever listed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub full_path: PathBuf,
    pub kind: EntryKind,
}

impl DirectoryEntry {
    pub fn new(full_path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        let full_path = full_path.into();
        Self {
            name: display_name(&full_path),
            full_path,
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A node in the mirrored tree.
///
/// `full_path` is the identity of a node. Folder paths are always
/// compared through [`same_path`], so it doesn't matter whether they
/// were recorded with a trailing separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Display name, same as the filesystem entry's name.
    pub name: String,

    /// The filesystem path this node mirrors.
    pub full_path: PathBuf,

    pub kind: NodeKind,

    /// The project item this node was materialized as.
    pub handle: ItemHandle,

    /// Child nodes in insertion order. Always empty for files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates a folder node.
    pub fn folder(name: impl Into<String>, full_path: impl Into<PathBuf>, handle: ItemHandle) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            kind: NodeKind::Folder,
            handle,
            children: Vec::new(),
        }
    }

    /// Creates a file node.
    pub fn file(full_path: impl Into<PathBuf>, handle: ItemHandle) -> Self {
        let full_path = full_path.into();
        Self {
            name: display_name(&full_path),
            full_path,
            kind: NodeKind::File,
            handle,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Appends a child. Files can't have children.
    pub fn push_child(&mut self, child: TreeNode) {
        debug_assert!(self.is_folder(), "file node '{}' can't hold children", self.name);
        self.children.push(child);
    }

    /// Finds a folder anywhere in this subtree (self included) by path.
    pub fn find_folder(&self, path: &Path) -> Option<&TreeNode> {
        if self.is_folder() && same_path(&self.full_path, path) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_folder(path))
    }

    /// Mutable version of [`find_folder`](Self::find_folder).
    pub fn find_folder_mut(&mut self, path: &Path) -> Option<&mut TreeNode> {
        if self.is_folder() && same_path(&self.full_path, path) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_folder_mut(path))
    }

    /// Position of a direct child folder with the given path.
    pub fn child_folder_position(&self, path: &Path) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.is_folder() && same_path(&c.full_path, path))
    }

    /// Whether a direct child file mirrors the given path.
    pub fn has_file(&self, path: &Path) -> bool {
        self.children
            .iter()
            .any(|c| !c.is_folder() && same_path(&c.full_path, path))
    }

    /// Number of file nodes in this subtree.
    pub fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| if c.is_folder() { c.file_count() } else { 1 })
            .sum()
    }

    /// Number of folder nodes below this one.
    pub fn folder_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.is_folder())
            .map(|c| 1 + c.folder_count())
            .sum()
    }

    /// Depth-first iterator over this node and everything below it.
    pub fn walk(&self) -> impl Iterator<Item = (usize, &TreeNode)> {
        let mut stack = vec![(0usize, self)];
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
            Some((depth, node))
        })
    }
}
