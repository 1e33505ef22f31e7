//! Domain-specific error types for the stagehand pipeline.
//!
//! Library modules return the typed errors below; command handlers at the
//! CLI boundary convert them to [`anyhow::Error`] via the standard `?`
//! operator.
//!
//! # Error hierarchy
//!
//! ```text
//! StagehandError
//! ├── Config(ConfigError)       reading and parsing the key/value document
//! ├── Render(RenderError)       template walk, syntax, missing keys
//! └── Placement(PlacementError) stat, type conflict, I/O, backup, manifest, cleanup
//! ```
//!
//! Every variant carries the path(s) it concerns. Nothing in the pipeline
//! retries or recovers locally: errors travel unchanged to the top level.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the stagehand pipeline.
#[derive(Error, Debug)]
pub enum StagehandError {
    /// Configuration document could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Template tree could not be rendered into the staging directory.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Staging tree could not be placed onto the target.
    #[error("placement error: {0}")]
    Placement(#[from] PlacementError),
}

/// Errors that arise from loading the configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("can't read config file {path}: {source}")]
    Read {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("can't parse config file {path}: {source}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Errors that arise while rendering the template tree.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The template tree could not be walked.
    #[error("can't walk template directory {root}: {source}")]
    Walk {
        /// Root of the template tree.
        root: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// A filesystem operation failed while producing the staging tree.
    #[error("can't {operation} {path}: {source}")]
    Io {
        /// Short verb describing the failed operation.
        operation: &'static str,
        /// Path being operated on.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A template failed to parse or evaluate.
    #[error("can't render template {relative}: {source}")]
    Template {
        /// Template path relative to the template root.
        relative: String,
        /// Underlying template engine error.
        source: minijinja::Error,
    },

    /// The template tree contains something other than files and directories.
    #[error("file '{relative}' has unsupported file type")]
    UnsupportedFileType {
        /// Offending path relative to the template root.
        relative: String,
    },
}

/// Errors that arise while placing the staging tree onto the target.
#[derive(Error, Debug)]
pub enum PlacementError {
    /// A target path could not be inspected for a reason other than absence.
    #[error("can't stat {path}: {source}")]
    Stat {
        /// Path that could not be inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The target root is missing or not a directory.
    #[error("target root {path} is not an existing directory")]
    MissingTargetRoot {
        /// Configured target root.
        path: PathBuf,
    },

    /// The staging tree could not be walked.
    #[error("can't walk staging directory {root}: {source}")]
    Walk {
        /// Root of the staging tree.
        root: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// The staging tree contains something other than files and directories.
    #[error("staged path {path} has unsupported file type")]
    UnsupportedFileType {
        /// Offending staged path.
        path: PathBuf,
    },

    /// A non-empty target directory stands where the staging tree has a file.
    #[error(
        "destination path {target} is a directory, but source path {source_path} ({relative}) \
         is a file; the destination directory can't be overwritten because it is not empty"
    )]
    TypeConflict {
        /// Live target path.
        target: PathBuf,
        /// Staged source path.
        source_path: PathBuf,
        /// Path relative to both roots.
        relative: String,
    },

    /// A filesystem operation on the target or backup tree failed.
    #[error("can't {operation} {path}: {source}")]
    Io {
        /// Short verb describing the failed operation.
        operation: &'static str,
        /// Path being operated on.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Ownership could not be changed.
    #[error("can't chown {path}: {source}")]
    Chown {
        /// Path being operated on.
        path: PathBuf,
        /// Underlying errno.
        source: nix::Error,
    },

    /// The pre-existing target entry could not be preserved, so it was left untouched.
    #[error("can't back up {path}: {source}")]
    Backup {
        /// Live target path whose backup failed.
        path: PathBuf,
        /// The failure inside the backup step.
        source: Box<PlacementError>,
    },

    /// The manifest log could not be written. Placement itself is not undone.
    #[error("can't write manifest log {path}: {source}")]
    ManifestWrite {
        /// Requested manifest location.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The staging tree could not be deleted after placement.
    #[error("can't remove staging directory {path}: {source}")]
    Cleanup {
        /// Staging root.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl PlacementError {
    /// Wrap an I/O error with the operation and path it concerns.
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

impl RenderError {
    /// Wrap an I/O error with the operation and path it concerns.
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
