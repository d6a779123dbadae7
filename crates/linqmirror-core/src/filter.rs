//! Allow-list filtering.
//!
//! Decides which files and folders of a LINQPad layout get mirrored.
//! Two matching modes exist: `Exact` is the sane one and the default;
//! `Loose` reproduces the containment checks older installations were
//! built with, for projects that already rely on what they let through.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Folder names eligible for mirroring.
pub const DEFAULT_FOLDERS: &[&str] = &["drivers", "plugins", "queries", "snippets"];

/// File extensions eligible for mirroring.
pub const DEFAULT_EXTENSIONS: &[&str] = &["xml", "linq"];

/// How allow-list entries are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-insensitive equality: the extension must be one of the
    /// allowed ones and the folder's own name one of the allowed names.
    #[default]
    Exact,

    /// Containment: the dotted extension must occur inside the
    /// concatenation of allowed extensions (`".xml.linq"`), and any
    /// allowed name must occur inside the folder's lower-cased full path.
    /// Lets through `.x`, `.l` and extension-less files (but not
    /// dotfiles), and any folder below a path that happens to contain
    /// `queries`.
    Loose,
}

/// The allow-lists plus the mode used to apply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    folders: Vec<String>,
    extensions: Vec<String>,
    mode: MatchMode,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FOLDERS, DEFAULT_EXTENSIONS, MatchMode::default())
    }
}

impl EntryFilter {
    /// Creates a filter. Names and extensions are lower-cased; a leading
    /// dot on an extension is dropped.
    pub fn new<F, E>(folders: F, extensions: E, mode: MatchMode) -> Self
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            folders: folders
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .collect(),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            mode,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks whether a file should be mirrored. Only the name is looked
    /// at; the file is never opened.
    pub fn accepts_file(&self, path: &Path) -> bool {
        let extension = path.extension().map(|e| e.to_string_lossy());
        match self.mode {
            MatchMode::Exact => match extension {
                Some(ext) => {
                    let ext = ext.to_lowercase();
                    self.extensions.iter().any(|allowed| *allowed == ext)
                }
                None => false,
            },
            MatchMode::Loose => self
                .loose_extension_haystack()
                .contains(&dotted_extension(path)),
        }
    }

    /// Checks whether a directory should be mirrored.
    pub fn accepts_folder(&self, path: &Path) -> bool {
        match self.mode {
            MatchMode::Exact => match path.file_name() {
                Some(name) => {
                    let name = name.to_string_lossy().to_lowercase();
                    self.folders.iter().any(|allowed| *allowed == name)
                }
                None => false,
            },
            MatchMode::Loose => {
                let full = path.to_string_lossy().to_lowercase();
                self.folders.iter().any(|allowed| full.contains(allowed.as_str()))
            }
        }
    }

    fn loose_extension_haystack(&self) -> String {
        self.extensions.iter().map(|e| format!(".{}", e)).collect()
    }
}

/// Everything from the last dot of the file name on, or nothing when the
/// name has no dot or ends in one. Unlike [`Path::extension`], a dotfile
/// such as `.gitignore` is all extension.
fn dotted_extension(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => name[dot..].to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose() -> EntryFilter {
        EntryFilter::default().with_mode(MatchMode::Loose)
    }

    #[test]
    fn test_exact_accepts_allowed_extensions() {
        let filter = EntryFilter::default();
        assert!(filter.accepts_file(Path::new("q/report.linq")));
        assert!(filter.accepts_file(Path::new("q/ConnectionsV2.xml")));
        assert!(filter.accepts_file(Path::new("q/UPPER.LINQ")));
    }

    #[test]
    fn test_exact_rejects_other_extensions() {
        let filter = EntryFilter::default();
        assert!(!filter.accepts_file(Path::new("notes.txt")));
        assert!(!filter.accepts_file(Path::new("a.x")));
        assert!(!filter.accepts_file(Path::new("README")));
        assert!(!filter.accepts_file(Path::new("LINQPad6.exe")));
    }

    #[test]
    fn test_loose_matches_fragments() {
        let filter = loose();
        assert!(filter.accepts_file(Path::new("report.linq")));
        assert!(filter.accepts_file(Path::new("a.x")));
        assert!(filter.accepts_file(Path::new("a.l")));
        assert!(!filter.accepts_file(Path::new("a.q")));
        assert!(filter.accepts_file(Path::new("README")));
        assert!(!filter.accepts_file(Path::new("notes.txt")));
        // Containment is ordinal, like the installations it mimics.
        assert!(!filter.accepts_file(Path::new("UPPER.LINQ")));
        // Dotfiles are all extension, and none of them is allowed.
        assert!(!filter.accepts_file(Path::new("LinqPad/.gitignore")));
        assert!(!filter.accepts_file(Path::new("LinqPad/.DS_Store")));
        assert!(filter.accepts_file(Path::new("LinqPad/.linq")));
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("q/report.linq")), ".linq");
        assert_eq!(dotted_extension(Path::new("a.b.xml")), ".xml");
        assert_eq!(dotted_extension(Path::new(".gitignore")), ".gitignore");
        assert_eq!(dotted_extension(Path::new("README")), "");
        assert_eq!(dotted_extension(Path::new("trailing.")), "");
    }

    #[test]
    fn test_exact_folder_matches_own_name_only() {
        let filter = EntryFilter::default();
        assert!(filter.accepts_folder(Path::new("sln/LinqPad/Queries")));
        assert!(filter.accepts_folder(Path::new("sln/LinqPad/drivers")));
        assert!(!filter.accepts_folder(Path::new("sln/LinqPad/random")));
        assert!(!filter.accepts_folder(Path::new("sln/queries/LinqPad/random")));
        assert!(!filter.accepts_folder(Path::new("sln/LinqPad/old-snippets")));
    }

    #[test]
    fn test_loose_folder_matches_anywhere_in_path() {
        let filter = loose();
        assert!(filter.accepts_folder(Path::new("sln/LinqPad/Queries")));
        assert!(filter.accepts_folder(Path::new("sln/LinqPad/old-snippets")));
        assert!(filter.accepts_folder(Path::new("sln/queries/LinqPad/random")));
        assert!(!filter.accepts_folder(Path::new("sln/LinqPad/random")));
    }

    #[test]
    fn test_new_normalizes_input() {
        let filter = EntryFilter::new(["Queries"], [".LINQ"], MatchMode::Exact);
        assert!(filter.accepts_file(Path::new("a.linq")));
        assert!(filter.accepts_folder(Path::new("x/queries")));
    }
}
