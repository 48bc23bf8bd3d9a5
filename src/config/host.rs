//! Host identity detection.
use anyhow::{Context as _, Result};
use std::fmt;
use std::path::Path;

use crate::exec;

/// Environment variable that overrides the detected host name.
pub const HOSTNAME_ENV: &str = "LINKTHEDOTS_HOSTNAME";

/// Files consulted for the host name before falling back to `hostname`.
const HOSTNAME_FILES: &[&str] = &["/proc/sys/kernel/hostname", "/etc/hostname"];

/// Case-normalised host name used to select a configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostIdentity(String);

impl HostIdentity {
    /// Build an identity from any host name spelling.
    ///
    /// ```
    /// use linkthedots::config::host::HostIdentity;
    ///
    /// assert_eq!(HostIdentity::new("  My-Laptop\n").as_str(), "my-laptop");
    /// ```
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// The normalised identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the identity of the current machine.
    ///
    /// Precedence: `explicit`, then [`HOSTNAME_ENV`], then the kernel / `/etc`
    /// host name files, then the `hostname` command.
    ///
    /// # Errors
    ///
    /// Returns an error if no source yields a non-empty host name.
    pub fn detect(explicit: Option<&str>) -> Result<Self> {
        if let Some(name) = explicit.filter(|n| !n.trim().is_empty()) {
            return Ok(Self::new(name));
        }
        if let Ok(name) = std::env::var(HOSTNAME_ENV)
            && !name.trim().is_empty()
        {
            return Ok(Self::new(&name));
        }
        for file in HOSTNAME_FILES {
            if let Some(name) = read_hostname_file(Path::new(file)) {
                return Ok(Self::new(&name));
            }
        }
        let result = exec::run("hostname", &[]).context("detecting host name")?;
        let name = result.stdout.trim();
        anyhow::ensure!(!name.is_empty(), "hostname returned an empty name");
        Ok(Self::new(name))
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn read_hostname_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = content.trim();
    (!name.is_empty()).then(|| name.to_string())
}
