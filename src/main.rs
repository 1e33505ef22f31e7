//! `stagehand` command-line entry point.
use anyhow::Result;
use clap::Parser;

use stagehand::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let command = args.command.name();
    if !matches!(args.command, cli::Command::Version) {
        logging::init_subscriber(args.verbose, command);
    }
    let log = logging::Logger::new(command);

    match args.command {
        cli::Command::Apply(opts) => commands::apply::run(&opts, &log),
        cli::Command::Render(opts) => commands::render::run(&opts, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
