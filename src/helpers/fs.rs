//! File-system helpers.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Returns `true` if the directory at `path` has no entries.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Remove a file or an *empty* directory at `path`.
///
/// Never recurses: a non-empty directory makes `remove_dir` fail, which is
/// exactly what a caller that already checked emptiness wants to hear about.
///
/// # Errors
///
/// Returns an error if the node cannot be removed.
pub fn remove_node(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// Sibling path used while a file is being written, so the rename into place
/// stays on one filesystem.
fn sibling_tmp(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map_or_else(|| "stagehand".into(), |n| n.to_string_lossy().into_owned());
    dest.with_file_name(format!(".{name}.stagehand-tmp"))
}

/// Copy the bytes of `source` over `dest`.
///
/// The content is staged to a hidden sibling first and renamed into place, so
/// an interrupted copy never leaves a truncated `dest` behind.
///
/// # Errors
///
/// Returns an error if the copy or the rename fails; the temporary sibling is
/// removed on failure.
pub fn copy_file_into_place(source: &Path, dest: &Path) -> io::Result<()> {
    let tmp = sibling_tmp(dest);
    if let Err(e) = fs::copy(source, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
