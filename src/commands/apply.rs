//! Command: render templates into a staging tree and place it onto the target.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{prepare_output_dir, render_into};
use crate::cli::ApplyOpts;
use crate::error::StagehandError;
use crate::logging::Logger;
use crate::place::{Manifest, PlacementEngine, PlacementStats, cleanup_staging};

/// Run the apply command.
///
/// Placement failures abort the run, but the paths placed so far are still
/// written to the manifest log. Manifest and cleanup failures are reported
/// after placement and make the command fail without undoing anything.
///
/// # Errors
///
/// Returns an error if configuration loading, rendering or placement fails,
/// or if the manifest log or staging cleanup fails afterwards.
pub fn run(opts: &ApplyOpts, log: &Logger) -> Result<()> {
    log.info(&format!("stagehand {}", super::version::version()));

    let staging = create_staging(opts.staging.as_deref())?;
    log.debug(&format!("staging directory: {}", staging.display()));
    if let Err(e) = render_into(&opts.source, &staging, log) {
        log.warn(&format!("incomplete staging tree left at {}", staging.display()));
        return Err(e.into());
    }

    log.stage(if opts.dry_run {
        "Placing staging tree (dry run)"
    } else {
        "Placing staging tree"
    });
    let mut engine = PlacementEngine::new(&staging, &opts.dest).with_dry_run(opts.dry_run);
    if let Some(backup) = &opts.backup {
        log.info(&format!("backing up replaced paths into {}", backup.display()));
        engine = engine.with_backup(backup);
    }

    let mut manifest = Manifest::new();
    let stats = match engine.run(&mut manifest) {
        Ok(stats) => stats,
        Err(e) => {
            if let Some(path) = &opts.log
                && let Err(write_err) = manifest.write_to(path)
            {
                log.error(&write_err.to_string());
            }
            log.warn(&format!(
                "{} paths were placed before the failure; staging tree kept at {}",
                manifest.len(),
                staging.display()
            ));
            return Err(StagehandError::from(e)).context("placement aborted");
        }
    };

    finish(opts, &staging, &manifest, &stats, log)
}

/// Write the manifest, remove or keep the staging tree, and print the summary.
fn finish(
    opts: &ApplyOpts,
    staging: &Path,
    manifest: &Manifest,
    stats: &PlacementStats,
    log: &Logger,
) -> Result<()> {
    let mut failures = Vec::new();

    if let Some(path) = &opts.log {
        match manifest.write_to(path) {
            Ok(()) => log.info(&format!(
                "wrote {} manifest entries to {}",
                manifest.len(),
                path.display()
            )),
            Err(e) => {
                log.error(&e.to_string());
                failures.push(e);
            }
        }
    }

    if opts.dry_run {
        log.dry_run(&format!("staging tree kept at {}", staging.display()));
    } else if let Err(e) = cleanup_staging(staging) {
        log.error(&e.to_string());
        failures.push(e);
    } else {
        log.debug(&format!("removed staging directory {}", staging.display()));
    }

    log.print_summary(stats, opts.dry_run);

    match failures.into_iter().next() {
        Some(first) => Err(first).context("placement completed, but finishing the run failed"),
        None => Ok(()),
    }
}

/// Use the requested staging directory, or create a fresh temporary one that
/// outlives this process.
fn create_staging(requested: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = requested {
        prepare_output_dir(path)?;
        return Ok(path.to_path_buf());
    }
    let dir = tempfile::Builder::new()
        .prefix("stagehand")
        .tempdir()
        .context("creating staging directory")?;
    Ok(dir.keep())
}
