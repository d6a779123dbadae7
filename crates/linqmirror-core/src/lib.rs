//! LinqMirror Core - directory-to-tree reconciliation
//!
//! This crate holds the logic that decides which parts of a LINQPad
//! folder layout end up in a project tree, and how that tree grows as
//! new files appear on disk. It knows nothing about any particular IDE:
//! the project system is reached through the [`ProjectMirrorSink`] trait
//! and the filesystem through [`DirectoryReader`].
//!
//! # Example
//!
//! ```no_run
//! use linqmirror_core::{EntryFilter, FsDirectoryReader, MemoryProject, TreeBuilder};
//! use std::path::Path;
//!
//! let root = Path::new("MySolution/LinqPad");
//! let mut project = MemoryProject::new("LINQPad", root);
//! let mut tree = project.mirror_tree();
//!
//! let reader = FsDirectoryReader::default();
//! let filter = EntryFilter::default();
//! let summary = TreeBuilder::new(&reader, &filter)
//!     .build(root, &mut tree, &mut project)
//!     .unwrap();
//! println!("{} files mirrored", summary.files_added);
//! ```

pub mod bootstrap;
pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod inserter;
pub mod layout;
pub mod node;
pub mod path;
pub mod project;
pub mod reader;
pub mod sink;

pub use bootstrap::bootstrap_mirror;
pub use builder::{BuildSummary, TreeBuilder};
pub use config::MirrorConfig;
pub use error::{MirrorError, Result};
pub use filter::{EntryFilter, MatchMode};
pub use inserter::{IncrementalInserter, Insertion};
pub use layout::{ProvisionReport, SolutionLayout};
pub use node::{DirectoryEntry, EntryKind, ItemHandle, NodeKind, TreeNode};
pub use project::{MemoryProject, ProjectItem};
pub use reader::{DirectoryReader, FsDirectoryReader};
pub use sink::ProjectMirrorSink;
