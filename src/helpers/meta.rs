//! Node kind, permission bits and ownership of a filesystem node.
use std::fs::{self, Metadata, Permissions};
use std::io;
use std::os::unix::fs::{MetadataExt as _, PermissionsExt as _};
use std::path::Path;

use nix::unistd::{Gid, Uid};

/// Mask selecting permission, setuid/setgid and sticky bits from `st_mode`.
pub const MODE_MASK: u32 = 0o7777;

/// The kind of a filesystem node, as far as placement is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else (symlink when not followed, fifo, socket, device).
    Other,
}

/// Kind, mode and ownership of a single node.
///
/// # Examples
///
/// ```
/// use stagehand::helpers::meta::{NodeKind, NodeMeta};
///
/// let a = NodeMeta { kind: NodeKind::File, mode: 0o644, uid: 0, gid: 0 };
/// let b = NodeMeta { mode: 0o600, ..a };
///
/// assert!(a.same_kind(&b));
/// assert!(!a.same_attributes(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMeta {
    /// Node kind.
    pub kind: NodeKind,
    /// Permission bits, masked with [`MODE_MASK`].
    pub mode: u32,
    /// Owner uid.
    pub uid: u32,
    /// Owner gid.
    pub gid: u32,
}

impl NodeMeta {
    /// Extract kind, mode and ownership from `std::fs` metadata.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_dir() {
            NodeKind::Directory
        } else if file_type.is_file() {
            NodeKind::File
        } else {
            NodeKind::Other
        };
        Self {
            kind,
            mode: metadata.mode() & MODE_MASK,
            uid: metadata.uid(),
            gid: metadata.gid(),
        }
    }

    /// Stat `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, including `NotFound`.
    pub fn stat(path: &Path) -> io::Result<Self> {
        fs::metadata(path).map(|m| Self::from_metadata(&m))
    }

    /// Returns `true` for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Returns `true` when both nodes are of the same kind.
    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        self.kind == other.kind
    }

    /// Returns `true` when mode bits, owner and group all match.
    #[must_use]
    pub const fn same_attributes(&self, other: &Self) -> bool {
        self.mode == other.mode && self.uid == other.uid && self.gid == other.gid
    }
}

/// Failure of [`apply_metadata`], split by step so callers can report it precisely.
#[derive(Debug)]
pub enum ApplyError {
    /// `chown(2)` failed.
    Chown(nix::Error),
    /// `chmod(2)` failed.
    Chmod(io::Error),
}

/// Set owner, group and mode of `path` to exactly those in `meta`.
///
/// Ownership goes first because `chown` may clear setuid/setgid bits that the
/// subsequent `chmod` restores.
///
/// # Errors
///
/// Returns [`ApplyError`] naming the step that failed.
pub fn apply_metadata(path: &Path, meta: &NodeMeta) -> Result<(), ApplyError> {
    nix::unistd::chown(
        path,
        Some(Uid::from_raw(meta.uid)),
        Some(Gid::from_raw(meta.gid)),
    )
    .map_err(ApplyError::Chown)?;
    fs::set_permissions(path, Permissions::from_mode(meta.mode)).map_err(ApplyError::Chmod)
}
