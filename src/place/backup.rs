//! Preservation of live nodes before they are replaced.
//!
//! The backup tree mirrors the target tree: a node at `<target>/etc/app.conf`
//! is preserved at `<backup>/etc/app.conf`, with a missing `etc` directory
//! created first and given the live directory's mode and ownership. An
//! ancestor already present in the backup tree keeps the metadata it was
//! backed up with. Only the node being replaced is copied; for a directory
//! that is the directory itself, never its children. A dangling symlink is
//! backed up as a symlink with the same destination.
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use super::entry::TargetEntry;
use super::primitive::place;
use crate::error::PlacementError;
use crate::helpers::meta::{NodeKind, NodeMeta};

/// A directory tree receiving copies of replaced nodes.
#[derive(Debug, Clone)]
pub struct BackupTree {
    root: PathBuf,
}

impl BackupTree {
    /// Back up into `root`. The directory is created on first use.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The backup root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy the live node `existing`, found at `relative` under `target_root`,
    /// into the backup tree.
    ///
    /// A backup left by an earlier run at the same path is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Backup`] wrapping the step that failed. The
    /// live node is never modified here.
    pub fn preserve(
        &self,
        target_root: &Path,
        relative: &Path,
        existing: &TargetEntry,
    ) -> Result<(), PlacementError> {
        self.preserve_inner(target_root, relative, existing)
            .map_err(|source| PlacementError::Backup {
                path: existing.path.clone(),
                source: Box::new(source),
            })
    }

    fn preserve_inner(
        &self,
        target_root: &Path,
        relative: &Path,
        existing: &TargetEntry,
    ) -> Result<(), PlacementError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| PlacementError::io("create directory", &self.root, e))?;

        let mut prefix = PathBuf::new();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                prefix.push(component);
                let mirror = self.root.join(&prefix);
                if mirror.is_dir() {
                    continue;
                }
                let live = target_root.join(&prefix);
                let meta = NodeMeta::stat(&live).map_err(|source| PlacementError::Stat {
                    path: live.clone(),
                    source,
                })?;
                clear_stale(&mirror, &meta)?;
                place(&live, &mirror, &meta)?;
            }
        }

        let dest = self.root.join(relative);
        clear_stale(&dest, &existing.meta)?;
        if existing.meta.kind == NodeKind::Other {
            return copy_link(&existing.path, &dest);
        }
        place(&existing.path, &dest, &existing.meta)
    }
}

/// Remove whatever an earlier run left at `path` unless the node about to be
/// written there can take its place directly.
fn clear_stale(path: &Path, meta: &NodeMeta) -> Result<(), PlacementError> {
    let Ok(previous) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    let result = match (previous.is_dir(), meta.kind) {
        (true, NodeKind::Directory) | (false, NodeKind::File) => return Ok(()),
        (true, _) => fs::remove_dir_all(path),
        (false, _) => fs::remove_file(path),
    };
    result.map_err(|e| PlacementError::io("remove stale backup", path, e))
}

/// Recreate the symlink at `live` as `dest`, pointing where it points.
fn copy_link(live: &Path, dest: &Path) -> Result<(), PlacementError> {
    let pointee = fs::read_link(live).map_err(|e| PlacementError::io("read link", live, e))?;
    symlink(&pointee, dest).map_err(|e| PlacementError::io("create symlink", dest, e))
}
