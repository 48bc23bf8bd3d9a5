//! Domain-specific error types for the linking engine.
//!
//! Configuration problems are the only errors that abort a run. They are
//! raised as [`ConfigError`] while the configuration is loaded and resolved,
//! before any filesystem mutation happens. Command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! Link failures are **not** errors: a run that links some
//! files and skips others is a successful run. Each skipped link carries a
//! [`SkipReason`] instead.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError        : file loading, section selection, container/rule shape
//! SkipReason (data)  : why a single link ended up `skipped`
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from loading and normalising the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("File \"{}\" not found.", .0.display())]
    FileNotFound(PathBuf),

    /// An I/O error occurred while reading the configuration file.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON/TOML.
    #[error("Incorrectly formatted config file {file} ({message})")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The top level of the configuration is not a mapping of sections.
    #[error("Configuration must be a mapping of sections")]
    NotAMapping,

    /// No section matches the host identity.
    #[error("Section matching machine's hostname \"{0}\" wasn't found.")]
    SectionNotFound(String),

    /// A section matches the host identity only when case-folded.
    #[error("Section names must be in lowercase (found \"{0}\").")]
    SectionNotLowercase(String),

    /// More than one section claims the host identity.
    #[error("Host \"{host}\" is claimed by several sections: {}", .sections.join(", "))]
    AmbiguousSection {
        /// The host identity being resolved.
        host: String,
        /// Every section key that claims it.
        sections: Vec<String>,
    },

    /// The selected host section is not a mapping.
    #[error("Section \"{0}\" must be a mapping.")]
    InvalidSection(String),

    /// The reserved `general` section is not a mapping.
    #[error("Improperly formatted \"general\" section.")]
    InvalidGeneral,

    /// A toggle option holds something other than a boolean.
    #[error("Option \"{key}\" in \"{section}\" must be true or false.")]
    InvalidOption {
        /// Section holding the option.
        section: String,
        /// Offending option key.
        key: String,
    },

    /// The host section has no `containers` key.
    #[error("No \"containers\" key in \"{0}\".")]
    NoContainersKey(String),

    /// The host section's `containers` value is not a mapping.
    #[error("Improperly formatted \"containers\" value in \"{0}\".")]
    InvalidContainers(String),

    /// `general.containers` is not a mapping.
    #[error("Improperly formatted general \"containers\".")]
    InvalidGeneralContainers,

    /// A host container has no template in `general.containers`.
    #[error("Container \"{0}\" doesn't appear in \"general\".")]
    ContainerNotInGeneral(String),

    /// A container value has an unusable shape.
    #[error("Improperly formatted container \"{container}\": {reason}")]
    InvalidContainer {
        /// Container name.
        container: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The `packages` value of a container is neither a string nor a list of strings.
    #[error("Improperly formatted packages for \"{0}\".")]
    InvalidPackages(String),

    /// The `rules` value of a container has the wrong overall shape.
    #[error("Improperly formatted rules for \"{container}\"{}", hint_suffix(.hint))]
    InvalidRules {
        /// Container name.
        container: String,
        /// Extra guidance, e.g. when the `pkg` flag is the likely cause.
        hint: Option<String>,
    },

    /// A single `[mode, files]` rule is malformed.
    #[error("Improperly formatted rule for \"{package}\" in \"{container}\": {reason}")]
    InvalidRule {
        /// Container name.
        container: String,
        /// Package the rule belongs to.
        package: String,
        /// What is wrong with it.
        reason: String,
    },
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map_or_else(String::new, |h| format!(" ({h})"))
}

/// Why a link candidate ended up in the `skipped` bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A non-link file exists at the destination and overwriting is disabled.
    Conflict,
    /// A real directory exists at the destination; it is never removed.
    Directory,
    /// The operating system denied access during `operation`.
    PermissionDenied {
        /// The step that was denied (e.g. `"create link"`).
        operation: &'static str,
    },
    /// Any other filesystem failure during `operation`.
    Io {
        /// The step that failed.
        operation: &'static str,
        /// The underlying error message.
        message: String,
    },
    /// The link state machine did not converge within its transition budget.
    RetryLimit,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(f, "file exists and overwrite is disabled"),
            Self::Directory => write!(f, "destination is a directory"),
            Self::PermissionDenied { operation } => write!(f, "permission denied ({operation})"),
            Self::Io { operation, message } => write!(f, "{operation} failed: {message}"),
            Self::RetryLimit => write!(f, "link did not converge"),
        }
    }
}
