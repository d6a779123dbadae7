//! In-memory project tree with JSON persistence.
//!
//! Stands in for an IDE solution folder: items live in an arena, handles
//! are arena indices, and folders record their path with a trailing
//! separator the way solution folders do. The whole thing round-trips
//! through a JSON project file.

use crate::error::{MirrorError, Result};
use crate::node::{ItemHandle, NodeKind, TreeNode};
use crate::path::{folder_path_string, normalize};
use crate::sink::ProjectMirrorSink;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One item of a [`MemoryProject`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub name: String,
    pub kind: NodeKind,

    /// Mirrored path. Folders end with a separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemHandle>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemHandle>,
}

/// A project tree rooted at the mirror folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryProject {
    version: u32,
    items: Vec<ProjectItem>,
}

impl MemoryProject {
    const VERSION: u32 = 1;

    /// Creates a project whose root folder `name` mirrors `root_path`.
    pub fn new(name: &str, root_path: &Path) -> Self {
        let root = ProjectItem {
            name: name.to_string(),
            kind: NodeKind::Folder,
            full_path: Some(folder_path_string(root_path)),
            parent: None,
            children: Vec::new(),
        };
        Self {
            version: Self::VERSION,
            items: vec![root],
        }
    }

    /// Loads a project file written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| MirrorError::io(path, e))?;
        let project: Self = serde_json::from_str(&raw).map_err(|e| MirrorError::Project {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        project.validate().map_err(|message| MirrorError::Project {
            path: path.to_path_buf(),
            message,
        })?;
        debug!("Loaded {} project items from {}", project.items.len(), path.display());
        Ok(project)
    }

    /// Writes the project as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| MirrorError::Project {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| MirrorError::io(path, e))
    }

    pub fn item(&self, handle: ItemHandle) -> Option<&ProjectItem> {
        self.items.get(handle.index())
    }

    /// Total number of items, root included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rebuilds the mirror tree from what the project already contains.
    pub fn mirror_tree(&self) -> TreeNode {
        self.node_at(self.root_handle())
    }

    fn node_at(&self, handle: ItemHandle) -> TreeNode {
        let item = &self.items[handle.index()];
        let full_path = item
            .full_path
            .as_deref()
            .map(|p| normalize(Path::new(p)))
            .unwrap_or_default();
        TreeNode {
            name: item.name.clone(),
            full_path,
            kind: item.kind,
            handle,
            children: item.children.iter().map(|&c| self.node_at(c)).collect(),
        }
    }

    fn folder(&self, handle: ItemHandle) -> Result<&ProjectItem> {
        match self.item(handle) {
            Some(item) if item.kind == NodeKind::Folder => Ok(item),
            _ => Err(MirrorError::InvalidHandle(handle)),
        }
    }

    fn push(&mut self, parent: ItemHandle, item: ProjectItem) -> ItemHandle {
        let handle = ItemHandle::new(self.items.len() as u32);
        self.items.push(item);
        self.items[parent.index()].children.push(handle);
        handle
    }

    /// Checks that every handle points inside the arena, that parent
    /// links agree with child lists, and that files have no children.
    fn validate(&self) -> std::result::Result<(), String> {
        if self.version != Self::VERSION {
            return Err(format!("unsupported version {}", self.version));
        }
        let Some(root) = self.items.first() else {
            return Err("project has no root item".to_string());
        };
        if root.kind != NodeKind::Folder || root.parent.is_some() {
            return Err("root item must be a top-level folder".to_string());
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.kind == NodeKind::File && !item.children.is_empty() {
                return Err(format!("file item '{}' has children", item.name));
            }
            for &child in &item.children {
                let Some(child_item) = self.items.get(child.index()) else {
                    return Err(format!("item '{}' references missing child {}", item.name, child));
                };
                if child_item.parent.map(ItemHandle::index) != Some(index) {
                    return Err(format!("item '{}' has a mismatched parent link", child_item.name));
                }
            }
        }
        Ok(())
    }
}

impl ProjectMirrorSink for MemoryProject {
    fn root_handle(&self) -> ItemHandle {
        ItemHandle::new(0)
    }

    fn children(&self, parent: ItemHandle) -> Vec<ItemHandle> {
        self.item(parent)
            .map(|item| item.children.clone())
            .unwrap_or_default()
    }

    fn full_path(&self, item: ItemHandle) -> Option<PathBuf> {
        self.item(item)?.full_path.as_deref().map(PathBuf::from)
    }

    fn add_file(&mut self, parent: ItemHandle, full_path: &Path) -> Result<ItemHandle> {
        self.folder(parent)?;
        let meta = fs::metadata(full_path).map_err(|e| MirrorError::io(full_path, e))?;
        if !meta.is_file() {
            return Err(MirrorError::io(
                full_path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let item = ProjectItem {
            name: crate::path::display_name(full_path),
            kind: NodeKind::File,
            full_path: Some(normalize(full_path).to_string_lossy().into_owned()),
            parent: Some(parent),
            children: Vec::new(),
        };
        let handle = self.push(parent, item);
        debug!("Added file {} as {}", full_path.display(), handle);
        Ok(handle)
    }

    fn add_folder(&mut self, parent: ItemHandle, name: &str) -> Result<ItemHandle> {
        let parent_path = self.folder(parent)?.full_path.clone();
        let item = ProjectItem {
            name: name.to_string(),
            kind: NodeKind::Folder,
            full_path: parent_path.map(|p| folder_path_string(&Path::new(&p).join(name))),
            parent: Some(parent),
            children: Vec::new(),
        };
        let handle = self.push(parent, item);
        debug!("Added folder {} as {}", name, handle);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::MAIN_SEPARATOR;
    use tempfile::tempdir;

    #[test]
    fn test_new_project_root_is_folder_with_trailing_separator() {
        let dir = tempdir().unwrap();
        let project = MemoryProject::new("LINQPad", dir.path());
        let root = project.item(project.root_handle()).unwrap();
        assert_eq!(root.kind, NodeKind::Folder);
        assert!(root.full_path.as_deref().unwrap().ends_with(MAIN_SEPARATOR));
    }

    #[test]
    fn test_find_child_by_path_ignores_trailing_separator() {
        let dir = tempdir().unwrap();
        let mut project = MemoryProject::new("LINQPad", dir.path());
        let root = project.root_handle();
        let queries = project.add_folder(root, "Queries").unwrap();

        let found = project.find_child_by_path(root, &dir.path().join("Queries"));
        assert_eq!(found, Some(queries));
        assert!(project
            .find_child_by_path(root, &dir.path().join("drivers"))
            .is_none());
    }

    #[test]
    fn test_add_file_requires_readable_file() {
        let dir = tempdir().unwrap();
        let mut project = MemoryProject::new("LINQPad", dir.path());
        let root = project.root_handle();

        let err = project
            .add_file(root, &dir.path().join("missing.linq"))
            .unwrap_err();
        assert!(matches!(err, MirrorError::FilesystemAccess { .. }));
        assert_eq!(project.len(), 1);
    }

    #[test]
    fn test_add_file_under_file_is_invalid_handle() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.linq");
        fs::write(&file, "").unwrap();
        let mut project = MemoryProject::new("LINQPad", dir.path());
        let leaf = project.add_file(project.root_handle(), &file).unwrap();

        let err = project.add_file(leaf, &file).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidHandle(h) if h == leaf));
        let err = project.add_folder(ItemHandle::new(99), "x").unwrap_err();
        assert!(matches!(err, MirrorError::InvalidHandle(_)));
    }

    #[test]
    fn test_save_and_load_keeps_handles() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Queries").join("a.linq");
        fs::create_dir(dir.path().join("Queries")).unwrap();
        fs::write(&file, "").unwrap();

        let mut project = MemoryProject::new("LINQPad", dir.path());
        let queries = project.add_folder(project.root_handle(), "Queries").unwrap();
        let leaf = project.add_file(queries, &file).unwrap();

        let project_file = dir.path().join(".linqmirror").join("project.json");
        project.save(&project_file).unwrap();
        let loaded = MemoryProject::load(&project_file).unwrap();

        assert_eq!(loaded, project);
        assert_eq!(loaded.find_child_by_path(queries, &file), Some(leaf));
    }

    #[test]
    fn test_load_rejects_dangling_child() {
        let dir = tempdir().unwrap();
        let project_file = dir.path().join("project.json");
        fs::write(
            &project_file,
            r#"{"version":1,"items":[{"name":"LINQPad","kind":"folder","children":[5]}]}"#,
        )
        .unwrap();

        let err = MemoryProject::load(&project_file).unwrap_err();
        assert!(matches!(err, MirrorError::Project { .. }));
    }

    #[test]
    fn test_mirror_tree_reflects_items() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("drivers").join("d1.xml");
        fs::create_dir(dir.path().join("drivers")).unwrap();
        fs::write(&file, "").unwrap();

        let mut project = MemoryProject::new("LINQPad", dir.path());
        let drivers = project.add_folder(project.root_handle(), "drivers").unwrap();
        project.add_file(drivers, &file).unwrap();

        let tree = project.mirror_tree();
        assert_eq!(tree.name, "LINQPad");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].full_path, dir.path().join("drivers"));
        assert_eq!(tree.children[0].children[0].full_path, file);
        assert_eq!(tree.file_count(), 1);
    }
}
