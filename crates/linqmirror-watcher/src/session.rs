//! Live mirror sessions.
//!
//! A session owns one mirror (the tree and its project sink) for as long
//! as a solution is open. The mirror lives inside a single tokio task;
//! watcher callbacks and API calls never touch it directly, they queue a
//! command and the task applies commands one at a time in arrival order.

use crate::error::WatchError;
use crate::watcher::{FileChange, FileWatcher};
use linqmirror_core::{
    BuildSummary, EntryFilter, FsDirectoryReader, IncrementalInserter, Insertion, MirrorError,
    ProjectMirrorSink, TreeBuilder, TreeNode,
};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 256;

/// How to open a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// The LINQPad directory the mirror root mirrors.
    pub root_path: PathBuf,

    pub filter: EntryFilter,

    /// Follow symbolic links when listing directories.
    pub follow_symlinks: bool,

    /// Start a filesystem watcher. Without one, changes only arrive
    /// through [`SessionHandle::notify`].
    pub watch: bool,
}

impl SessionOptions {
    pub fn new(root_path: impl Into<PathBuf>, filter: EntryFilter) -> Self {
        Self {
            root_path: root_path.into(),
            filter,
            follow_symlinks: false,
            watch: true,
        }
    }
}

/// Something the session did, for anyone listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A created file was mirrored.
    Inserted { path: PathBuf, insertion: Insertion },

    /// A created file didn't pass the filter.
    Ignored(PathBuf),

    /// A file was deleted; the mirror keeps it.
    DeletionIgnored(PathBuf),

    /// Mirroring a created file failed. The session keeps going.
    Failed { path: PathBuf, message: String },

    /// A full resync finished.
    Resynced(BuildSummary),
}

enum Command<S> {
    Apply(FileChange),
    Resync(oneshot::Sender<Result<BuildSummary, MirrorError>>),
    Snapshot(oneshot::Sender<TreeNode>),
    Checkpoint(oneshot::Sender<(TreeNode, S)>),
    Shutdown,
}

/// Cheap, cloneable way to queue work for a session.
pub struct SessionHandle<S> {
    tx: mpsc::UnboundedSender<Command<S>>,
}

impl<S> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> SessionHandle<S> {
    /// Queues a filesystem change as if the watcher had seen it.
    pub fn notify(&self, change: FileChange) -> Result<(), WatchError> {
        self.tx
            .send(Command::Apply(change))
            .map_err(|_| WatchError::Closed)
    }

    /// Queues a full resync and waits for its result.
    pub async fn resync(&self) -> Result<BuildSummary, WatchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Resync(reply))
            .map_err(|_| WatchError::Closed)?;
        let summary = rx.await.map_err(|_| WatchError::Closed)??;
        Ok(summary)
    }

    /// A copy of the tree as of every command queued before this one.
    pub async fn snapshot(&self) -> Result<TreeNode, WatchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply))
            .map_err(|_| WatchError::Closed)?;
        rx.await.map_err(|_| WatchError::Closed)
    }

    /// Copies of the tree and the sink as of every command queued before
    /// this one, for persisting a mirror that is still live.
    pub async fn checkpoint(&self) -> Result<(TreeNode, S), WatchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Checkpoint(reply))
            .map_err(|_| WatchError::Closed)?;
        rx.await.map_err(|_| WatchError::Closed)
    }
}

/// An open mirror.
pub struct MirrorSession<S> {
    handle: SessionHandle<S>,
    events: broadcast::Sender<SessionEvent>,
    watcher: Option<FileWatcher>,
    task: JoinHandle<Mirror<S>>,
    root_path: PathBuf,
}

impl<S> MirrorSession<S>
where
    S: ProjectMirrorSink + Clone + Send + 'static,
{
    /// Opens a session over an existing mirror.
    ///
    /// Fails with `RelativeRoot` for a relative root and with `NotFound`
    /// if the LINQPad directory is missing. Starts the watcher (if asked
    /// to) and then runs an initial resync; a failed resync fails the open.
    pub async fn open(sink: S, tree: TreeNode, options: SessionOptions) -> Result<Self, WatchError> {
        let root_path = options.root_path.clone();
        linqmirror_core::path::require_absolute(&root_path)?;
        if !root_path.is_dir() {
            return Err(MirrorError::not_found("LINQPad directory", &root_path).into());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let mirror = Mirror {
            root_path: root_path.clone(),
            tree,
            sink,
            filter: options.filter,
            reader: FsDirectoryReader::new(options.follow_symlinks),
            events: events.clone(),
        };
        let task = tokio::spawn(mirror.run(rx));
        let handle = SessionHandle { tx };

        let watcher = if options.watch {
            let tx = handle.tx.clone();
            Some(FileWatcher::new(&root_path, move |change| {
                if tx.send(Command::Apply(change)).is_err() {
                    debug!("Dropping change, session is closed");
                }
            })?)
        } else {
            None
        };

        let summary = handle.resync().await?;
        info!(
            "Mirror session open for {} ({} files mirrored)",
            root_path.display(),
            summary.files_added + summary.files_existing
        );

        Ok(Self {
            handle,
            events,
            watcher,
            task,
            root_path,
        })
    }

    pub fn handle(&self) -> SessionHandle<S> {
        self.handle.clone()
    }

    /// Listens to what the session does from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub async fn resync(&self) -> Result<BuildSummary, WatchError> {
        self.handle.resync().await
    }

    pub async fn snapshot(&self) -> Result<TreeNode, WatchError> {
        self.handle.snapshot().await
    }

    pub async fn checkpoint(&self) -> Result<(TreeNode, S), WatchError> {
        self.handle.checkpoint().await
    }

    /// Stops watching, applies everything already queued, and hands the
    /// mirror back.
    pub async fn close(mut self) -> Result<(TreeNode, S), WatchError> {
        // Stop new changes before the final command goes in.
        self.watcher.take();
        if self.handle.tx.send(Command::Shutdown).is_err() {
            debug!("Session task already stopped");
        }
        let mirror = self.task.await?;
        info!("Mirror session closed for {}", self.root_path.display());
        Ok((mirror.tree, mirror.sink))
    }
}

/// The state owned by the session task.
struct Mirror<S> {
    root_path: PathBuf,
    tree: TreeNode,
    sink: S,
    filter: EntryFilter,
    reader: FsDirectoryReader,
    events: broadcast::Sender<SessionEvent>,
}

impl<S: ProjectMirrorSink + Clone> Mirror<S> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command<S>>) -> Self {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Apply(change) => self.apply(change),
                Command::Resync(reply) => {
                    let result = self.resync();
                    let _ = reply.send(result);
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.tree.clone());
                }
                Command::Checkpoint(reply) => {
                    let _ = reply.send((self.tree.clone(), self.sink.clone()));
                }
                Command::Shutdown => break,
            }
        }
        debug!("Session task for {} finished", self.root_path.display());
        self
    }

    fn apply(&mut self, change: FileChange) {
        let inserter = IncrementalInserter::new(&self.filter);
        let event = match change {
            FileChange::Created(path) => {
                match inserter.insert_created(&path, &mut self.tree, &mut self.sink) {
                    Ok(Insertion::Ignored) => SessionEvent::Ignored(path),
                    Ok(insertion) => SessionEvent::Inserted { path, insertion },
                    Err(e) => {
                        warn!("Failed to mirror {}: {}", path.display(), e);
                        SessionEvent::Failed {
                            path,
                            message: e.to_string(),
                        }
                    }
                }
            }
            FileChange::Deleted(path) => {
                inserter.remove_deleted(&path, &self.tree);
                SessionEvent::DeletionIgnored(path)
            }
        };
        self.emit(event);
    }

    fn resync(&mut self) -> Result<BuildSummary, MirrorError> {
        let summary = TreeBuilder::new(&self.reader, &self.filter).build(
            &self.root_path,
            &mut self.tree,
            &mut self.sink,
        )?;
        self.emit(SessionEvent::Resynced(summary));
        Ok(summary)
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}
