//! File watcher for live mirrors.
//!
//! Uses the notify crate to watch the LINQPad directory and hands
//! creations and deletions to a callback. Modifications don't change
//! what's mirrored, so they're dropped here.

use notify::event::CreateKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A filesystem change the mirror cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Created(PathBuf),
    Deleted(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::Deleted(p) => p,
        }
    }
}

/// Watches a directory tree for file changes.
///
/// Dropping the watcher stops the notifications.
pub struct FileWatcher {
    _watcher: notify::RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Starts watching `root` recursively.
    ///
    /// `on_change` runs on notify's own thread, so it should only hand
    /// the change off (e.g. into a channel).
    pub fn new<F>(root: &Path, on_change: F) -> Result<Self, notify::Error>
    where
        F: Fn(FileChange) + Send + 'static,
    {
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for change in classify(event) {
                        on_change(change);
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            }
        })?;

        watcher.watch(root, RecursiveMode::Recursive)?;

        info!("Watching {} for changes", root.display());

        Ok(Self {
            _watcher: watcher,
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Turns a notify event into the changes we forward.
fn classify(event: Event) -> Vec<FileChange> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => event
            .paths
            .into_iter()
            // Some backends only say "something was created".
            .filter(|p| !p.is_dir())
            .map(|p| {
                debug!("File created: {}", p.display());
                FileChange::Created(p)
            })
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .into_iter()
            .map(|p| {
                debug!("File deleted: {}", p.display());
                FileChange::Deleted(p)
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{ModifyKind, RemoveKind};
    use std::fs;
    use std::sync::mpsc::channel;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_watcher_creation() {
        let dir = tempdir().unwrap();
        let watcher = FileWatcher::new(dir.path(), |_| {});
        assert!(watcher.is_ok());
    }

    #[test]
    fn test_watcher_missing_root_fails() {
        let dir = tempdir().unwrap();
        let watcher = FileWatcher::new(&dir.path().join("missing"), |_| {});
        assert!(watcher.is_err());
    }

    #[test]
    fn test_classify_create_and_remove() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.linq");
        fs::write(&file, "").unwrap();

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(file.clone());
        assert_eq!(classify(created), vec![FileChange::Created(file.clone())]);

        let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(file.clone());
        assert_eq!(classify(removed), vec![FileChange::Deleted(file.clone())]);
    }

    #[test]
    fn test_classify_drops_folders_and_modifications() {
        let dir = tempdir().unwrap();
        let folder = Event::new(EventKind::Create(CreateKind::Folder)).add_path(dir.path().join("Queries"));
        assert!(classify(folder).is_empty());

        // Untyped creation of an existing directory.
        let any = Event::new(EventKind::Create(CreateKind::Any)).add_path(dir.path().to_path_buf());
        assert!(classify(any).is_empty());

        let modified = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(dir.path().join("a.linq"));
        assert!(classify(modified).is_empty());
    }

    #[test]
    fn test_watcher_reports_created_file() {
        let dir = tempdir().unwrap();
        let (tx, rx) = channel();
        let _watcher = FileWatcher::new(dir.path(), move |change| {
            let _ = tx.send(change);
        })
        .unwrap();

        let file = dir.path().join("new.linq");
        fs::write(&file, "").unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while std::time::Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(FileChange::Created(p)) if p.file_name() == file.file_name() => {
                    seen = true;
                    break;
                }
                _ => continue,
            }
        }
        assert!(seen, "no creation event for {}", file.display());
    }
}
