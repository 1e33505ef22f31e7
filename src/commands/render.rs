//! Command: render the template tree into a directory for inspection.
use anyhow::Result;

use super::{prepare_output_dir, render_into};
use crate::cli::RenderOpts;
use crate::logging::Logger;

/// Run the render command.
///
/// # Errors
///
/// Returns an error if the output directory is not empty, the configuration
/// cannot be loaded, or any template fails to render.
pub fn run(opts: &RenderOpts, log: &Logger) -> Result<()> {
    prepare_output_dir(&opts.output)?;
    let stats = render_into(&opts.source, &opts.output, log)?;
    log.info(&format!(
        "{} entries rendered into {}",
        stats.total(),
        opts.output.display()
    ));
    Ok(())
}
