//! Command-line arguments.
use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::DEFAULT_CONFIG_FILE;

/// Version string shown by `--version`.
pub const VERSION: &str = match option_env!("LINKTHEDOTS_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Link your dot(file)s.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "linkthedots", about = "Link your dot(file)s", version = VERSION)]
pub struct Cli {
    /// Path to the config file (`.toml` is parsed as TOML, anything else as JSON)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Force dry-run (no change) mode
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Force replacing existing files at the destination
    #[arg(short, long)]
    pub overwrite: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Force grouping report lines by outcome
    #[arg(short, long)]
    pub group_output: bool,

    /// Host name to resolve instead of the machine's own
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,
}
