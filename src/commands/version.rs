//! Command: print version information.

/// The build version: `STAGEHAND_VERSION` at build time, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("STAGEHAND_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the stagehand version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("stagehand {}", version());
}
