//! Writing a single node and fixing up its metadata.
use std::fs;
use std::path::Path;

use crate::error::PlacementError;
use crate::helpers::fs::copy_file_into_place;
use crate::helpers::meta::{ApplyError, NodeKind, NodeMeta, apply_metadata};

/// Materialize `source` at `dest` as a node described by `meta`, then set
/// owner, group and mode to exactly those in `meta`.
///
/// Directories are created (an existing directory is kept as is); files are
/// copied through a sibling temporary and renamed over `dest`. The metadata
/// fix-up runs unconditionally, so an existing node with the wrong mode or
/// owner converges too.
///
/// # Errors
///
/// Returns [`PlacementError::Io`] or [`PlacementError::Chown`] naming the
/// step that failed, and [`PlacementError::UnsupportedFileType`] when `meta`
/// describes neither a file nor a directory.
pub fn place(source: &Path, dest: &Path, meta: &NodeMeta) -> Result<(), PlacementError> {
    match meta.kind {
        NodeKind::Directory => {
            fs::create_dir_all(dest).map_err(|e| PlacementError::io("create directory", dest, e))?;
        }
        NodeKind::File => {
            copy_file_into_place(source, dest).map_err(|e| PlacementError::io("copy", dest, e))?;
        }
        NodeKind::Other => {
            return Err(PlacementError::UnsupportedFileType {
                path: source.to_path_buf(),
            });
        }
    }
    fix_metadata(dest, meta)
}

/// Set owner, group and mode of `path`.
///
/// # Errors
///
/// Returns [`PlacementError::Chown`] or a `chmod` [`PlacementError::Io`].
pub fn fix_metadata(path: &Path, meta: &NodeMeta) -> Result<(), PlacementError> {
    apply_metadata(path, meta).map_err(|e| match e {
        ApplyError::Chown(source) => PlacementError::Chown {
            path: path.to_path_buf(),
            source,
        },
        ApplyError::Chmod(source) => PlacementError::io("chmod", path, source),
    })
}
