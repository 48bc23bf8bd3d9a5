//! Command-line entry point for linkthedots.
use anyhow::Result;
use clap::Parser;

use linkthedots::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, "link");
    let log = logging::Logger::new("link");

    let setup = commands::CommandSetup::init(&args, &log)?;
    logging::set_console_verbose(setup.options.verbose);

    let result = commands::link::run(&setup.options, &log);
    log.print_summary();
    result?;

    if log.has_failures() {
        anyhow::bail!("{} container(s) could not be linked", log.failure_count());
    }
    Ok(())
}
