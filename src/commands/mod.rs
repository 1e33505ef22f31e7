//! Top-level subcommand orchestration.
pub mod apply;
pub mod render;
pub mod version;

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::SourceOpts;
use crate::config::ConfigTree;
use crate::error::StagehandError;
use crate::helpers::fs::is_empty_dir;
use crate::logging::Logger;
use crate::render::{BuiltinFunctions, RenderStats, Renderer};

/// Load the configuration and render the template tree into `output`.
///
/// # Errors
///
/// Returns [`StagehandError::Config`] if the configuration cannot be loaded
/// and [`StagehandError::Render`] if any template fails to render.
pub fn render_into(
    source: &SourceOpts,
    output: &Path,
    log: &Logger,
) -> Result<RenderStats, StagehandError> {
    log.stage("Loading configuration");
    let config = ConfigTree::load(&source.config)?;
    if config.is_empty() {
        log.warn(&format!("{} defines no keys", source.config.display()));
    } else {
        log.info(&format!(
            "loaded {} top-level keys from {}",
            config.len(),
            source.config.display()
        ));
    }

    log.stage("Rendering templates");
    let renderer = Renderer::new(&config).with_functions(&BuiltinFunctions::system());
    let stats = renderer.render_tree(&source.templates, output)?;
    log.info(&stats.summary());
    log.debug(&format!("rendered into {}", output.display()));
    Ok(stats)
}

/// Make sure `path` is an empty directory, creating it if absent.
///
/// Rendering into a directory with leftovers would place those leftovers too.
///
/// # Errors
///
/// Returns an error if `path` exists and is not an empty directory, or cannot
/// be created.
pub fn prepare_output_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let empty = is_empty_dir(path)
            .with_context(|| format!("reading output directory {}", path.display()))?;
        if !empty {
            anyhow::bail!("output directory {} is not empty", path.display());
        }
        return Ok(());
    }
    fs::create_dir_all(path).with_context(|| format!("creating output directory {}", path.display()))
}
