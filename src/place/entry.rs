//! Staging and target entries visited during a placement run.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PlacementError;
use crate::helpers::meta::{NodeKind, NodeMeta};

/// One node under the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingEntry {
    /// Path relative to the staging root; never empty.
    pub relative: PathBuf,
    /// Absolute path under the staging root.
    pub source: PathBuf,
    /// Kind, mode and ownership of the staged node.
    pub meta: NodeMeta,
}

/// The live node at a staging entry's relative path, when one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    /// Absolute path under the target root.
    pub path: PathBuf,
    /// Kind, mode and ownership of the live node (symlinks followed, unless
    /// dangling).
    pub meta: NodeMeta,
}

/// Walk the staging tree and return every node below `root`: directories
/// before their children, siblings in lexical order, the root itself omitted.
///
/// The list is built completely before anything is applied, so later
/// mutations of the target can never disturb the iteration.
///
/// # Errors
///
/// Returns [`PlacementError::Walk`] if the tree cannot be read and
/// [`PlacementError::UnsupportedFileType`] for nodes that are neither regular
/// files nor directories.
pub fn collect_staging(root: &Path) -> Result<Vec<StagingEntry>, PlacementError> {
    let walk_error = |source| PlacementError::Walk {
        root: root.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(walk_error)?;
        let meta = NodeMeta::from_metadata(&entry.metadata().map_err(walk_error)?);
        if meta.kind == NodeKind::Other {
            return Err(PlacementError::UnsupportedFileType {
                path: entry.path().to_path_buf(),
            });
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        entries.push(StagingEntry {
            relative,
            source: entry.path().to_path_buf(),
            meta,
        });
    }
    Ok(entries)
}

/// Stat the live node at `path`.
///
/// Symlinks are followed. A dangling symlink is still a node: it comes back
/// with its own `lstat` metadata (kind [`NodeKind::Other`]), so it is
/// replaced rather than written through.
///
/// Absence is `Ok(None)`. A path whose parent is not a directory is absent
/// too: that only happens in a dry run, where the parent's replacement was
/// decided but not carried out.
///
/// # Errors
///
/// Returns [`PlacementError::Stat`] for any other failure.
pub fn stat_target(path: &Path) -> Result<Option<TargetEntry>, PlacementError> {
    let stat_error = |source| PlacementError::Stat {
        path: path.to_path_buf(),
        source,
    };
    let absent = |e: &io::Error| {
        matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory)
    };
    let meta = match NodeMeta::stat(path) {
        Ok(meta) => meta,
        Err(e) if absent(&e) => match fs::symlink_metadata(path) {
            Ok(link) if link.file_type().is_symlink() => NodeMeta::from_metadata(&link),
            Ok(_) => return Err(stat_error(e)),
            Err(e) if absent(&e) => return Ok(None),
            Err(e) => return Err(stat_error(e)),
        },
        Err(e) => return Err(stat_error(e)),
    };
    Ok(Some(TargetEntry {
        path: path.to_path_buf(),
        meta,
    }))
}
