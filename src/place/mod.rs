//! Staged placement: converge a live target tree onto a rendered staging tree.
//!
//! A run walks the staging tree (directories before their children, siblings
//! in lexical order) and, for every node, compares it with the live node at
//! the same relative path under the target root:
//!
//! | Live node                         | Decision    | Effect                              |
//! |-----------------------------------|-------------|-------------------------------------|
//! | absent                            | `Create`    | write node, fix metadata            |
//! | same kind, mode, owner, content   | `Skip`      | nothing                             |
//! | differs                           | `Overwrite` | backup, remove if kind changes, write |
//! | non-empty dir where file staged   | `Reject`    | abort the run                       |
//!
//! Each created or overwritten path is appended to the caller's [`Manifest`]
//! as soon as it has been applied, so a failed run still reports what it
//! changed. Nothing already applied is rolled back.
pub mod backup;
pub mod compare;
pub mod decision;
pub mod entry;
pub mod manifest;
pub mod primitive;

use std::path::PathBuf;

pub use backup::BackupTree;
pub use compare::{Comparison, Difference, Fingerprint, compare};
pub use decision::{PlacementDecision, decide};
pub use entry::{StagingEntry, TargetEntry, collect_staging, stat_target};
pub use manifest::{Manifest, cleanup_staging};
pub use primitive::place;

use crate::error::PlacementError;
use crate::helpers::fs::remove_node;
use crate::logging::DRY_RUN_TARGET;

/// Counters for one placement run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlacementStats {
    /// Paths that did not exist before.
    pub created: u32,
    /// Paths whose kind, metadata or content was replaced.
    pub overwritten: u32,
    /// Paths already matching the staging tree.
    pub skipped: u32,
}

impl PlacementStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of manifest entries the run produced.
    #[must_use]
    pub const fn changed(&self) -> u32 {
        self.created + self.overwritten
    }

    /// Format the summary string (e.g. "2 created, 1 overwritten, 7 unchanged").
    ///
    /// # Examples
    ///
    /// ```
    /// use stagehand::place::PlacementStats;
    ///
    /// let stats = PlacementStats { created: 2, overwritten: 1, skipped: 7 };
    /// assert_eq!(stats.summary(false), "2 created, 1 overwritten, 7 unchanged");
    /// assert_eq!(
    ///     stats.summary(true),
    ///     "2 would be created, 1 would be overwritten, 7 unchanged"
    /// );
    /// ```
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        if dry_run {
            format!(
                "{} would be created, {} would be overwritten, {} unchanged",
                self.created, self.overwritten, self.skipped
            )
        } else {
            format!(
                "{} created, {} overwritten, {} unchanged",
                self.created, self.overwritten, self.skipped
            )
        }
    }
}

/// Placement of one staging tree onto one target tree.
///
/// # Examples
///
/// ```no_run
/// use stagehand::place::{Manifest, PlacementEngine};
///
/// let engine = PlacementEngine::new("/tmp/staging", "/")
///     .with_backup("/var/backups/stagehand")
///     .with_dry_run(true);
/// let mut manifest = Manifest::new();
/// let stats = engine.run(&mut manifest)?;
/// println!("{}", stats.summary(true));
/// # Ok::<(), stagehand::error::PlacementError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    staging_root: PathBuf,
    target_root: PathBuf,
    backup: Option<BackupTree>,
    dry_run: bool,
}

impl PlacementEngine {
    /// Place `staging_root` onto `target_root`, without backups.
    #[must_use]
    pub fn new(staging_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: staging_root.into(),
            target_root: target_root.into(),
            backup: None,
            dry_run: false,
        }
    }

    /// Copy every node to be overwritten into `root` first.
    #[must_use]
    pub fn with_backup(mut self, root: impl Into<PathBuf>) -> Self {
        self.backup = Some(BackupTree::new(root));
        self
    }

    /// Compute decisions and the manifest without touching any filesystem.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the placement, appending every applied path to `manifest`.
    ///
    /// On error, `manifest` holds the paths applied before the failure.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::MissingTargetRoot`] if the target root is not
    /// an existing directory, and the first stat, walk, type-conflict, backup
    /// or I/O failure otherwise.
    pub fn run(&self, manifest: &mut Manifest) -> Result<PlacementStats, PlacementError> {
        if !self.target_root.is_dir() {
            return Err(PlacementError::MissingTargetRoot {
                path: self.target_root.clone(),
            });
        }

        let entries = collect_staging(&self.staging_root)?;
        tracing::debug!(
            "placing {} staged entries from {} onto {}",
            entries.len(),
            self.staging_root.display(),
            self.target_root.display()
        );

        let mut stats = PlacementStats::new();
        for entry in &entries {
            self.apply(entry, manifest, &mut stats)?;
        }
        Ok(stats)
    }

    fn apply(
        &self,
        entry: &StagingEntry,
        manifest: &mut Manifest,
        stats: &mut PlacementStats,
    ) -> Result<(), PlacementError> {
        let dest = self.target_root.join(&entry.relative);
        let decision = decide(entry, stat_target(&dest)?)?;
        tracing::debug!("/{}: {decision}", entry.relative.display());

        match decision {
            PlacementDecision::Skip => {
                stats.skipped += 1;
                return Ok(());
            }
            PlacementDecision::Reject { existing } => {
                return Err(PlacementError::TypeConflict {
                    target: existing.path,
                    source_path: entry.source.clone(),
                    relative: entry.relative.display().to_string(),
                });
            }
            PlacementDecision::Create => {
                if self.dry_run {
                    tracing::info!(target: DRY_RUN_TARGET, "would create {}", dest.display());
                } else {
                    place(&entry.source, &dest, &entry.meta)?;
                    tracing::info!("created {}", dest.display());
                }
                stats.created += 1;
            }
            PlacementDecision::Overwrite {
                existing,
                difference,
            } => {
                if self.dry_run {
                    tracing::info!(
                        target: DRY_RUN_TARGET,
                        "would overwrite {} ({difference})",
                        dest.display()
                    );
                } else {
                    self.overwrite(entry, &existing, difference)?;
                    tracing::info!("overwrote {} ({difference})", dest.display());
                }
                stats.overwritten += 1;
            }
        }

        manifest.record(&entry.relative);
        Ok(())
    }

    /// Backup, then clear a node of the wrong kind, then write.
    fn overwrite(
        &self,
        entry: &StagingEntry,
        existing: &TargetEntry,
        difference: Difference,
    ) -> Result<(), PlacementError> {
        if let Some(backup) = &self.backup {
            backup.preserve(&self.target_root, &entry.relative, existing)?;
            tracing::debug!(
                "backed up {} into {}",
                existing.path.display(),
                backup.root().display()
            );
        }
        if difference == Difference::Kind {
            remove_node(&existing.path)
                .map_err(|e| PlacementError::io("remove", &existing.path, e))?;
        }
        place(&entry.source, &existing.path, &entry.meta)
    }
}
