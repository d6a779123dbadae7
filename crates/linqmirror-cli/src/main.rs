//! LinqMirror CLI - provision and mirror LINQPad next to a solution
//!
//! This is the entry point for setting up a solution's LINQPad folder
//! and keeping its project mirror in sync.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "linqmirror")]
#[command(author = "LinqMirror Contributors")]
#[command(version)]
#[command(about = "Mirror a solution's LINQPad folder into its project tree", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config for a solution directory
    Init {
        /// Solution directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Create the LINQPad folder layout and the mirror
    Provision {
        /// Solution directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Don't copy the LINQPad distribution
        #[arg(long)]
        skip_binaries: bool,

        /// Start LINQPad once provisioning is done
        #[arg(long)]
        launch: bool,
    },

    /// Resync the mirror with what's on disk
    Sync {
        /// Solution directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Keep the mirror in sync until interrupted
    Watch {
        /// Solution directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print the mirror
    Tree {
        /// Solution directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show layout and mirror status
    Status {
        /// Solution directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Provision {
            path,
            skip_binaries,
            launch,
        } => commands::provision(&path, skip_binaries, launch),
        Commands::Sync { path } => commands::sync(&path),
        Commands::Watch { path } => commands::watch(&path).await,
        Commands::Tree { path, json } => commands::tree(&path, json),
        Commands::Status { path } => commands::status(&path),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
