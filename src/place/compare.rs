//! Staged-versus-live equality.
//!
//! Checks run cheapest first: node kind, then mode and ownership, then (for
//! files only) a SHA-256 fingerprint of the content. Directories with equal
//! attributes are equal regardless of what they contain; their children are
//! compared on their own.
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest as _, Sha256};

use super::entry::{StagingEntry, TargetEntry};
use crate::error::PlacementError;

/// The first property in which a staged node differs from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difference {
    /// One is a directory and the other is not.
    Kind,
    /// Mode bits, owner or group differ.
    Attributes,
    /// File bytes differ.
    Content,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kind => "file type differs",
            Self::Attributes => "mode or ownership differs",
            Self::Content => "content differs",
        })
    }
}

/// Outcome of [`compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The live node already matches the staged one.
    Equal,
    /// The live node must be replaced or fixed up.
    Differs(Difference),
}

/// Hex-encoded SHA-256 digest of a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash the file at `path`, streaming its content.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Io`] if the file cannot be opened or read.
    pub fn of_file(path: &Path) -> Result<Self, PlacementError> {
        let mut file = File::open(path).map_err(|e| PlacementError::io("open", path, e))?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher).map_err(|e| PlacementError::io("read", path, e))?;
        let mut hex = String::with_capacity(64);
        for b in &hasher.finalize() {
            write!(hex, "{b:02x}").unwrap_or(());
        }
        Ok(Self(hex))
    }

    /// The digest as lowercase hex.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Compare a staged node with the live node at the same relative path.
///
/// # Errors
///
/// Returns [`PlacementError::Io`] if either file cannot be read for hashing.
pub fn compare(staged: &StagingEntry, live: &TargetEntry) -> Result<Comparison, PlacementError> {
    if !staged.meta.same_kind(&live.meta) {
        return Ok(Comparison::Differs(Difference::Kind));
    }
    if !staged.meta.same_attributes(&live.meta) {
        return Ok(Comparison::Differs(Difference::Attributes));
    }
    if staged.meta.is_dir() {
        return Ok(Comparison::Equal);
    }
    let wanted = Fingerprint::of_file(&staged.source)?;
    let found = Fingerprint::of_file(&live.path)?;
    if wanted == found {
        return Ok(Comparison::Equal);
    }
    tracing::debug!(
        "{}: sha256 {} -> {}",
        live.path.display(),
        found.as_str(),
        wanted.as_str()
    );
    Ok(Comparison::Differs(Difference::Content))
}
