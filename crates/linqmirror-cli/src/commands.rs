//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use linqmirror_core::{
    bootstrap_mirror, BuildSummary, DirectoryReader, FsDirectoryReader, Insertion, MemoryProject,
    MirrorConfig, MirrorError, ProvisionReport, SolutionLayout, TreeBuilder,
};
use linqmirror_watcher::{MirrorSession, SessionEvent, SessionOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Write a default config for a solution.
pub fn init(path: &Path) -> Result<()> {
    let path = &solution_dir(path)?;
    if MirrorConfig::config_path(path).exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    let written = MirrorConfig::default().save(path)?;

    println!("{} Wrote {}", "✓".green(), written.display());
    println!("  Run {} to set up LINQPad", "linqmirror provision".cyan());

    Ok(())
}

/// Create the layout, copy LINQPad in, and build the mirror.
pub fn provision(path: &Path, skip_binaries: bool, launch: bool) -> Result<()> {
    let path = &solution_dir(path)?;
    let config = MirrorConfig::load_or_default(path)?;
    let layout = config.layout(path);

    println!("{}", "Provisioning LINQPad...".cyan());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Creating layout...");

    let outcome = provision_and_mirror(path, &config, &layout, skip_binaries, &spinner);
    spinner.finish_and_clear();
    let (report, summary) = outcome?;

    println!(
        "{} Layout ready at {} ({} directories created, {} files copied)",
        "✓".green(),
        layout.root().display(),
        report.directories_created.len().to_string().cyan(),
        report.files_copied.len().to_string().cyan()
    );
    if report.connections_written {
        println!("  Wrote empty {}", linqmirror_core::layout::CONNECTIONS_FILE);
    }
    print_summary(&summary);

    if launch {
        launch_linqpad(&layout, &config)?;
    }

    Ok(())
}

fn provision_and_mirror(
    path: &Path,
    config: &MirrorConfig,
    layout: &SolutionLayout,
    skip_binaries: bool,
    spinner: &ProgressBar,
) -> Result<(ProvisionReport, BuildSummary)> {
    let source_dir = distribution_dir(config);
    let distribution = if skip_binaries {
        None
    } else {
        Some((source_dir.as_path(), config.distribution_files.as_slice()))
    };
    let report = layout.provision(distribution)?;

    spinner.set_message("Mirroring...");

    let project_path = MirrorConfig::project_path(path);
    let reader = FsDirectoryReader::new(config.follow_symlinks);
    let filter = config.filter();

    let summary = if project_path.exists() {
        let mut project = MemoryProject::load(&project_path)?;
        let mut tree = project.mirror_tree();
        let summary = TreeBuilder::new(&reader, &filter).build(layout.root(), &mut tree, &mut project)?;
        project.save(&project_path)?;
        summary
    } else {
        let mut project = MemoryProject::new(&config.mirror_name, layout.root());
        let mut tree = project.mirror_tree();
        let summary = bootstrap_mirror(layout.root(), &mut tree, &mut project, &reader, &filter)?;
        project.save(&project_path)?;
        summary
    };

    Ok((report, summary))
}

/// Resync the persisted mirror with the disk.
pub fn sync(path: &Path) -> Result<()> {
    let path = &solution_dir(path)?;
    let config = MirrorConfig::load_or_default(path)?;
    let layout = config.layout(path);
    let (mut project, project_path) = load_mirror(path, &layout)?;

    let reader = FsDirectoryReader::new(config.follow_symlinks);
    let filter = config.filter();
    let mut tree = project.mirror_tree();

    // Save whatever made it in, even if the build stopped partway.
    let result = TreeBuilder::new(&reader, &filter).build(layout.root(), &mut tree, &mut project);
    project.save(&project_path)?;
    print_summary(&result?);

    Ok(())
}

/// Keep the mirror live until Ctrl+C, saving it after every insert.
pub async fn watch(path: &Path) -> Result<()> {
    let path = &solution_dir(path)?;
    let config = MirrorConfig::load_or_default(path)?;
    let layout = config.layout(path);
    let (project, project_path) = load_mirror(path, &layout)?;
    let tree = project.mirror_tree();

    let mut options = SessionOptions::new(layout.root(), config.filter());
    options.follow_symlinks = config.follow_symlinks;

    let session = MirrorSession::open(project, tree, options).await?;
    let mut events = session.subscribe();

    println!("{} Watching {}", "✓".green(), session.root().display());
    println!("  Press {} to stop", "Ctrl+C".cyan());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    print_event(&event);
                    if matches!(event, SessionEvent::Inserted { .. }) {
                        save_checkpoint(&session, &project_path).await?;
                    }
                }
                Err(RecvError::Lagged(missed)) => warn!("Missed {} session events", missed),
                Err(RecvError::Closed) => break,
            },
        }
    }

    let (tree, project) = session.close().await?;
    project.save(&project_path)?;
    println!(
        "{} Saved mirror ({} files)",
        "✓".green(),
        tree.file_count().to_string().cyan()
    );

    Ok(())
}

/// Print the persisted mirror.
pub fn tree(path: &Path, json: bool) -> Result<()> {
    let path = &solution_dir(path)?;
    let config = MirrorConfig::load_or_default(path)?;
    let layout = config.layout(path);
    let (project, _) = load_mirror(path, &layout)?;
    let tree = project.mirror_tree();

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    for (depth, node) in tree.walk() {
        let indent = "  ".repeat(depth);
        if node.is_folder() {
            println!("{}{}/", indent, node.name.cyan().bold());
        } else {
            println!("{}{}", indent, node.name);
        }
    }

    Ok(())
}

/// Show layout and mirror status.
pub fn status(path: &Path) -> Result<()> {
    let path = &solution_dir(path)?;
    let config = MirrorConfig::load_or_default(path)?;
    let layout = config.layout(path);

    println!("{}", "LinqMirror Status".cyan().bold());
    println!();

    if !layout.exists() {
        println!("{} No LINQPad folder at {}", "✗".red(), layout.root().display());
        println!("  Run {} to create it", "linqmirror provision".cyan());
        return Ok(());
    }

    let reader = FsDirectoryReader::new(config.follow_symlinks);
    let filter = config.filter();

    println!("  {} {}", "LINQPad folder:".dimmed(), layout.root().display());
    for dir in layout.subfolder_paths() {
        let name = linqmirror_core::path::display_name(&dir);
        match reader.list_entries(&dir) {
            Ok(entries) => {
                let eligible = entries
                    .iter()
                    .filter(|e| !e.is_dir() && filter.accepts_file(&e.full_path))
                    .count();
                println!("  {} {} ({} eligible files)", "✓".green(), name, eligible);
            }
            Err(_) => println!("  {} {} (missing)", "✗".red(), name),
        }
    }

    let exe = layout.root().join(&config.executable);
    let mark = |ok: bool| if ok { "✓".green() } else { "✗".red() };
    println!("  {} {}", mark(exe.is_file()), config.executable);
    println!(
        "  {} {}",
        mark(layout.connections_path().is_file()),
        linqmirror_core::layout::CONNECTIONS_FILE
    );

    println!();
    let project_path = MirrorConfig::project_path(path);
    if !project_path.exists() {
        println!("{} No mirror yet", "✗".red());
        return Ok(());
    }
    let tree = MemoryProject::load(&project_path)?.mirror_tree();
    println!("  {} {}", "Mirror:".dimmed(), tree.name);
    println!("  {} {}", "Folders:".dimmed(), tree.folder_count());
    println!("  {} {}", "Files:".dimmed(), tree.file_count());
    println!("  {} {:?}", "Match mode:".dimmed(), config.match_mode);

    Ok(())
}

/// The solution directory as an absolute canonical path. Mirror paths are
/// identity keys, so `.` and `/abs/sln` must end up the same.
fn solution_dir(path: &Path) -> std::result::Result<PathBuf, MirrorError> {
    linqmirror_core::path::canonical_dir(path)
}

/// Persists the live mirror without stopping the session.
async fn save_checkpoint(
    session: &MirrorSession<MemoryProject>,
    project_path: &Path,
) -> Result<()> {
    let (_, project) = session.checkpoint().await?;
    project.save(project_path)?;
    Ok(())
}

/// Loads the persisted mirror, failing with `NotFound` when the LINQPad
/// folder or the mirror itself hasn't been created.
fn load_mirror(
    path: &Path,
    layout: &SolutionLayout,
) -> std::result::Result<(MemoryProject, PathBuf), MirrorError> {
    if !layout.exists() {
        return Err(MirrorError::not_found("LINQPad folder", layout.root()));
    }
    let project_path = MirrorConfig::project_path(path);
    if !project_path.exists() {
        return Err(MirrorError::not_found(
            "mirror (run `linqmirror provision` first)",
            &project_path,
        ));
    }
    Ok((MemoryProject::load(&project_path)?, project_path))
}

fn distribution_dir(config: &MirrorConfig) -> PathBuf {
    config
        .distribution_dir
        .clone()
        .unwrap_or_else(default_distribution_dir)
}

fn default_distribution_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\LINQPad6")
    } else {
        dirs::home_dir().unwrap_or_default().join("LINQPad6")
    }
}

fn launch_linqpad(layout: &SolutionLayout, config: &MirrorConfig) -> Result<()> {
    let exe = layout.root().join(&config.executable);
    if !exe.is_file() {
        return Err(MirrorError::not_found("LINQPad executable", exe).into());
    }

    let child = std::process::Command::new(&exe)
        .current_dir(layout.root())
        .spawn()
        .map_err(|e| MirrorError::io(&exe, e))?;
    println!("{} Launched LINQPad (pid {})", "🚀".cyan(), child.id());

    Ok(())
}

fn print_summary(summary: &BuildSummary) {
    println!(
        "{} Mirrored {} new files ({} already present) in {}ms",
        "✓".green(),
        summary.files_added.to_string().cyan(),
        summary.files_existing,
        summary.duration_ms
    );
    if summary.folders_missing > 0 {
        println!(
            "  {} {} allowed folders have no mirror folder and were skipped",
            "⚠".yellow(),
            summary.folders_missing
        );
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Inserted { path, insertion } => {
            let place = match insertion {
                Insertion::Attached { folder, .. } => linqmirror_core::path::display_name(folder),
                _ => "mirror root".to_string(),
            };
            println!("{} {} {}", "+".green(), path.display(), format!("({})", place).dimmed());
        }
        SessionEvent::DeletionIgnored(path) => {
            println!(
                "{} {} {}",
                "-".dimmed(),
                path.display(),
                "(deleted, kept in mirror)".dimmed()
            );
        }
        SessionEvent::Failed { path, message } => {
            println!("{} {}: {}", "⚠".yellow(), path.display(), message);
        }
        SessionEvent::Resynced(summary) => print_summary(summary),
        SessionEvent::Ignored(_) => {}
    }
}
