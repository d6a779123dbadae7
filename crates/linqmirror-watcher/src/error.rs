use linqmirror_core::MirrorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// The session task is gone; the handle outlived it.
    #[error("mirror session is closed")]
    Closed,

    #[error("mirror session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
