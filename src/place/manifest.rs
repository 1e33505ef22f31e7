//! The manifest of placed paths and removal of the staging tree.
use std::fs;
use std::path::Path;

use crate::error::PlacementError;

/// Ordered record of every path that was created or overwritten (or, in a
/// dry run, would have been).
///
/// Entries are the relative path with a leading `/`, in placement order.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use stagehand::place::Manifest;
///
/// let mut manifest = Manifest::new();
/// manifest.record(Path::new("etc"));
/// manifest.record(Path::new("etc/app.conf"));
/// assert_eq!(manifest.to_text(), "/etc\n/etc/app.conf\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<String>,
}

impl Manifest {
    /// An empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the path `relative` (relative to the target root).
    pub fn record(&mut self, relative: &Path) {
        self.entries.push(format!("/{}", relative.display()));
    }

    /// Recorded entries in order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One entry per line, each terminated by a newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.entries.iter().fold(String::new(), |mut out, entry| {
            out.push_str(entry);
            out.push('\n');
            out
        })
    }

    /// Write the manifest to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::ManifestWrite`] if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), PlacementError> {
        fs::write(path, self.to_text()).map_err(|source| PlacementError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Delete the staging tree rooted at `root`.
///
/// # Errors
///
/// Returns [`PlacementError::Cleanup`] if the tree cannot be removed.
pub fn cleanup_staging(root: &Path) -> Result<(), PlacementError> {
    fs::remove_dir_all(root).map_err(|source| PlacementError::Cleanup {
        path: root.to_path_buf(),
        source,
    })
}
