//! LinqMirror Watcher - keeping a mirror live
//!
//! This crate handles the moving parts around the reconciliation core:
//! - Watching the LINQPad directory for created and deleted files
//! - Owning a mirror for the lifetime of an open solution
//! - Funnelling every change through one queue so the tree and the
//!   project are only ever touched from one task

mod error;
mod session;
mod watcher;

pub use error::WatchError;
pub use session::{MirrorSession, SessionEvent, SessionHandle, SessionOptions};
pub use watcher::{FileChange, FileWatcher};
