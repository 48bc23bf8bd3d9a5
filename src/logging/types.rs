//! Core logging types: package entries, status, and the [`Log`] trait.

/// Per-package result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// `<container>/<package>` label.
    pub name: String,
    /// Final status of the package.
    pub status: PackageStatus,
    /// Optional detail message (e.g., link statistics or skip reason).
    pub message: Option<String>,
}

/// Status of a processed package (or of a container that never got as far
/// as its packages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Every planned link was created or refreshed.
    Ok,
    /// The package directory does not exist in the dotfiles tree.
    NotFound,
    /// At least one link was skipped.
    Skipped,
    /// Dry-run mode; no changes were applied.
    DryRun,
    /// The container could not be processed at all.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) writes through `tracing`; tests can
/// drive the orchestrator with a capturing implementation instead.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a package result for the summary.
    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>);
}
