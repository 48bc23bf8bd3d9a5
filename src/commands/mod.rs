//! Command orchestration: configuration setup and the link command.
pub mod link;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::host::HostIdentity;
use crate::config::{HostOptions, loader, resolve};
use crate::logging::Log;

/// Configuration resolved for this run.
///
/// Loads the configuration file, detects the host and normalises the host's
/// section, so the link command starts from ready-to-use options.
#[derive(Debug)]
pub struct CommandSetup {
    /// Configuration file that was read.
    pub config_path: PathBuf,
    /// Identity the section was selected for.
    pub host: HostIdentity,
    /// Normalised options, with command-line toggles applied.
    pub options: HostOptions,
}

impl CommandSetup {
    /// Load and resolve the configuration named on the command line.
    ///
    /// A failure is logged through `log` before it is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the host name cannot be determined or the
    /// configuration cannot be loaded or resolved.
    pub fn init(cli: &Cli, log: &dyn Log) -> Result<Self> {
        let setup = match Self::load(cli) {
            Ok(setup) => setup,
            Err(e) => {
                log.error(&format!("{e:#}"));
                return Err(e);
            }
        };
        log.debug(&format!(
            "config {} resolved for host \"{}\": {} container(s) (section \"{}\")",
            setup.config_path.display(),
            setup.host,
            setup.options.containers.len(),
            setup.options.tag
        ));
        Ok(setup)
    }

    fn load(cli: &Cli) -> Result<Self> {
        let raw = loader::load(&cli.config).context("Config error")?;
        let host = HostIdentity::detect(cli.host.as_deref())?;
        let mut options = resolve::resolve(&raw, &host).context("Config error")?;
        apply_flags(&mut options, cli);
        Ok(Self {
            config_path: cli.config.clone(),
            host,
            options,
        })
    }
}

/// Command-line toggles only ever switch options on.
pub fn apply_flags(options: &mut HostOptions, cli: &Cli) {
    options.dry_run |= cli.dry_run;
    options.overwrite |= cli.overwrite;
    options.verbose |= cli.verbose;
    options.group_output |= cli.group_output;
}
