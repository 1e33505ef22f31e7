//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Template tree used when `--templates` is not given.
pub const DEFAULT_TEMPLATES: &str = "/var/stagehand/templates/";

/// Configuration document used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "/etc/stagehand/config.toml";

/// Target root used when `--dest` is not given.
pub const DEFAULT_DEST: &str = "/";

/// Top-level CLI entry point for stagehand.
#[derive(Parser, Debug)]
#[command(
    name = "stagehand",
    about = "Render configuration templates and converge a directory tree onto them",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render templates into a staging tree and place it onto the target
    Apply(ApplyOpts),
    /// Render templates into a directory without placing them
    Render(RenderOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name of the subcommand, used for the log file name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "apply",
            Self::Render(_) => "render",
            Self::Version => "version",
        }
    }
}

/// Inputs of the render step, shared by `apply` and `render`.
#[derive(Args, Debug, Clone)]
pub struct SourceOpts {
    /// Template directory
    #[arg(short, long, default_value = DEFAULT_TEMPLATES)]
    pub templates: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Options for the `apply` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ApplyOpts {
    /// Template tree and configuration.
    #[command(flatten)]
    pub source: SourceOpts,

    /// Target directory the rendered tree is placed onto
    #[arg(short, long, default_value = DEFAULT_DEST)]
    pub dest: PathBuf,

    /// Copy every replaced path into this directory first
    #[arg(short, long)]
    pub backup: Option<PathBuf>,

    /// Write the list of created and overwritten paths to this file
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Report what would change without touching the target
    #[arg(short = 'r', long)]
    pub dry_run: bool,

    /// Render into this directory instead of a fresh temporary one
    #[arg(long)]
    pub staging: Option<PathBuf>,
}

/// Options for the `render` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RenderOpts {
    /// Template tree and configuration.
    #[command(flatten)]
    pub source: SourceOpts,

    /// Output directory (must be absent or empty)
    #[arg(short, long)]
    pub output: PathBuf,
}
