// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed set of trees (templates, staging,
// target, backup) and helpers to populate and inspect them, so each
// integration test can set up an isolated environment without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use stagehand::helpers::meta::NodeMeta;
use stagehand::place::PlacementEngine;
use walkdir::WalkDir;

/// Modification time every node is pinned to by [`pin_mtimes`].
pub const PINNED_MTIME: i64 = 1_000_000_000;

/// Isolated trees backed by a [`tempfile::TempDir`].
///
/// `staging/` and `target/` exist from the start; `backup/` is only named,
/// so tests can observe whether a run created it.
pub struct Trees {
    /// Temporary directory holding every tree.
    pub root: tempfile::TempDir,
}

impl Trees {
    /// Create empty staging and target trees.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(root.path().join("staging")).expect("create staging dir");
        fs::create_dir(root.path().join("target")).expect("create target dir");
        Self { root }
    }

    pub fn staging(&self) -> PathBuf {
        self.root.path().join("staging")
    }

    pub fn target(&self) -> PathBuf {
        self.root.path().join("target")
    }

    pub fn backup(&self) -> PathBuf {
        self.root.path().join("backup")
    }

    /// An engine placing `staging/` onto `target/`.
    pub fn engine(&self) -> PlacementEngine {
        PlacementEngine::new(self.staging(), self.target())
    }

    /// An engine placing `staging/` onto `target/`, backing up into `backup/`.
    pub fn engine_with_backup(&self) -> PlacementEngine {
        self.engine().with_backup(self.backup())
    }
}

/// Write a file with `content` and `mode` at `root/relative`, creating parents.
pub fn file(root: &Path, relative: &str, content: &str, mode: u32) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, content).expect("write file");
    fs::set_permissions(&path, Permissions::from_mode(mode)).expect("chmod file");
}

/// Create a directory with `mode` at `root/relative`, creating parents.
pub fn dir(root: &Path, relative: &str, mode: u32) {
    let path = root.join(relative);
    fs::create_dir_all(&path).expect("create dir");
    fs::set_permissions(&path, Permissions::from_mode(mode)).expect("chmod dir");
}

/// Read `root/relative` as a string.
pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("read file")
}

/// Mode bits of `root/relative`.
pub fn mode(root: &Path, relative: &str) -> u32 {
    NodeMeta::stat(&root.join(relative)).expect("stat").mode
}

/// Set the modification time of every node under `root` (root excluded) to
/// [`PINNED_MTIME`].
pub fn pin_mtimes(root: &Path) {
    let pinned = FileTime::from_unix_time(PINNED_MTIME, 0);
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.expect("walk");
        filetime::set_file_mtime(entry.path(), pinned).expect("set mtime");
    }
}

/// Everything observable about one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub meta: NodeMeta,
    pub mtime: FileTime,
    pub content: Option<Vec<u8>>,
}

/// Metadata, modification time and content of every node under `root`,
/// keyed by relative path.
pub fn tree_state(root: &Path) -> BTreeMap<PathBuf, NodeState> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.expect("walk");
            let metadata = entry.metadata().expect("metadata");
            let meta = NodeMeta::from_metadata(&metadata);
            let content = (!meta.is_dir()).then(|| fs::read(entry.path()).expect("read"));
            let relative = entry
                .path()
                .strip_prefix(root)
                .expect("under root")
                .to_path_buf();
            (
                relative,
                NodeState {
                    meta,
                    mtime: FileTime::from_last_modification_time(&metadata),
                    content,
                },
            )
        })
        .collect()
}
