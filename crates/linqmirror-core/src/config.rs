//! Mirror configuration.
//!
//! Lives in `.linqmirror/config.json` inside the solution directory.
//! Every field is optional in the file; anything left out takes the
//! default, so an empty object is a valid config.

use crate::error::{MirrorError, Result};
use crate::filter::{EntryFilter, MatchMode, DEFAULT_EXTENSIONS, DEFAULT_FOLDERS};
use crate::layout::SolutionLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory inside the solution that holds mirror state.
pub const STATE_DIR: &str = ".linqmirror";

const CONFIG_FILE: &str = "config.json";
const PROJECT_FILE: &str = "project.json";

/// Settings for one solution's mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MirrorConfig {
    /// Name of the mirror folder in the project tree.
    pub mirror_name: String,

    /// Name of the LINQPad directory inside the solution directory.
    pub directory_name: String,

    /// Subfolders created when provisioning.
    pub layout_folders: Vec<String>,

    /// Folder names eligible for mirroring.
    pub allowed_folders: Vec<String>,

    /// File extensions eligible for mirroring, without the dot.
    pub allowed_extensions: Vec<String>,

    pub match_mode: MatchMode,

    /// Where the LINQPad distribution is copied from. `None` lets the
    /// caller pick a platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_dir: Option<PathBuf>,

    /// Files copied from the distribution.
    pub distribution_files: Vec<String>,

    /// The LINQPad executable inside the layout.
    pub executable: String,

    /// Follow symbolic links when listing directories.
    pub follow_symlinks: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            mirror_name: "LINQPad".to_string(),
            directory_name: "LinqPad".to_string(),
            layout_folders: ["drivers", "plugins", "Queries", "snippets"]
                .map(String::from)
                .to_vec(),
            allowed_folders: DEFAULT_FOLDERS.iter().map(|s| s.to_string()).collect(),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            match_mode: MatchMode::Exact,
            distribution_dir: None,
            distribution_files: [
                "LINQPad6.exe",
                "LINQPad.GUI.dll",
                "LINQPad.GUI.runtimeconfig.json",
                "LINQPad.Runtime.dll",
                "LINQPad.Runtime.runtimeconfig.json",
            ]
            .map(String::from)
            .to_vec(),
            executable: "LINQPad6.exe".to_string(),
            follow_symlinks: false,
        }
    }
}

impl MirrorConfig {
    /// Path of the config file for a solution directory.
    pub fn config_path(solution_dir: &Path) -> PathBuf {
        solution_dir.join(STATE_DIR).join(CONFIG_FILE)
    }

    /// Path of the persisted project for a solution directory.
    pub fn project_path(solution_dir: &Path) -> PathBuf {
        solution_dir.join(STATE_DIR).join(PROJECT_FILE)
    }

    /// Loads the solution's config, or the defaults if there is none.
    pub fn load_or_default(solution_dir: &Path) -> Result<Self> {
        let path = Self::config_path(solution_dir);
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|e| MirrorError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| MirrorError::Config {
            path,
            message: e.to_string(),
        })
    }

    /// Writes the config as pretty JSON and returns where it went.
    pub fn save(&self, solution_dir: &Path) -> Result<PathBuf> {
        let path = Self::config_path(solution_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| MirrorError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| MirrorError::io(&path, e))?;
        Ok(path)
    }

    pub fn filter(&self) -> EntryFilter {
        EntryFilter::new(&self.allowed_folders, &self.allowed_extensions, self.match_mode)
    }

    pub fn layout(&self, solution_dir: &Path) -> SolutionLayout {
        SolutionLayout::new(
            solution_dir,
            &self.directory_name,
            self.layout_folders.iter().cloned(),
        )
    }
}
