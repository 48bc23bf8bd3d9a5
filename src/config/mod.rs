//! Configuration loading and per-host normalisation.
//!
//! A raw configuration holds a reserved `general` section with defaults and
//! one section per host. [`resolve::resolve`] picks the section for the
//! current [`host::HostIdentity`], merges it over the general defaults and
//! returns a typed [`HostOptions`].
pub mod host;
pub mod loader;
pub mod resolve;
pub mod value;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Whether a rule's file list selects or removes files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    /// Link only files matching one of the rule's entries.
    Include,
    /// Link every file except those matching one of the rule's entries.
    Exclude,
}

impl RuleMode {
    /// Parse the configuration spelling of a mode.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "include" => Some(Self::Include),
            "exclude" => Some(Self::Exclude),
            _ => None,
        }
    }
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => write!(f, "include"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

/// A normalised `(mode, files)` rule for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Include or exclude.
    pub mode: RuleMode,
    /// File-name or relative-path fragments, in configuration order.
    pub files: Vec<String>,
}

impl Rule {
    /// Split the rule into the `(include, exclude)` lists the planner takes.
    #[must_use]
    pub fn as_lists(&self) -> (&[String], &[String]) {
        match self.mode {
            RuleMode::Include => (self.files.as_slice(), &[]),
            RuleMode::Exclude => (&[], self.files.as_slice()),
        }
    }
}

/// One linking job: a source tree of packages and where to link them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Container name (its key in `containers`).
    pub name: String,
    /// Directory holding the packages, or the package itself when `pkg` is set.
    pub source: Option<PathBuf>,
    /// Directory the packages are linked into.
    pub destination: Option<PathBuf>,
    /// Allow creating the destination tree when it does not exist.
    pub destination_create: bool,
    /// The container source *is* a single package.
    pub pkg: bool,
    /// Explicit package selection; `None` means every package in `source`.
    pub packages: Option<BTreeSet<String>>,
    /// Per-package rules. With `pkg`, holds one entry keyed by [`Self::name`].
    pub rules: BTreeMap<String, Rule>,
}

impl ContainerSpec {
    /// Rule for `package`, if one was configured.
    #[must_use]
    pub fn rule_for(&self, package: &str) -> Option<&Rule> {
        self.rules.get(package)
    }
}

/// Normalised options for the current host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOptions {
    /// Declared `name` of the host section, or the host tag when absent.
    pub name: String,
    /// Key of the selected section; matched against `#tag` file names.
    pub tag: String,
    /// Simulate every link without touching the filesystem.
    pub dry_run: bool,
    /// Replace non-link files found at a destination.
    pub overwrite: bool,
    /// Show more detail while linking.
    pub verbose: bool,
    /// List report lines grouped by outcome instead of discovery order.
    pub group_output: bool,
    /// Containers by name.
    pub containers: BTreeMap<String, ContainerSpec>,
}
