//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, PackageEntry, PackageStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Every message also lands in `$XDG_CACHE_HOME/linkthedots/<command>.log`
/// through the file layer installed by
/// [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    packages: Mutex<Vec<PackageEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary; this
    /// constructor does not write to the file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            packages: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded package entries.
    #[must_use]
    pub fn package_entries(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a package result for the summary.
    pub fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Whether any container or package was recorded as failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the packages recorded as failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.packages.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|p| p.status == PackageStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded packages.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let packages = self.package_entries();
        if packages.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut ok = 0u32;
        let mut not_found = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for package in &packages {
            let (icon, color) = match package.status {
                PackageStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                PackageStatus::NotFound => {
                    not_found += 1;
                    ("·", "\x1b[2m")
                }
                PackageStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                PackageStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                PackageStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = package
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", package.name));
        }

        println!();
        let total = ok + not_found + skipped + dry_run + failed;
        self.info(&format!(
            "{total} packages: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{not_found} not found\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        self.record_package(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.package_entries().is_empty(), "expected empty package list");
    }

    #[test]
    fn record_package_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_package("dots/vim", PackageStatus::Skipped, Some("1 file(s) skipped"));
        let entries = log.package_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "dots/vim");
        assert_eq!(entries[0].message, Some("1 file(s) skipped".to_string()));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.failure_count(), 0);
        log.record_package("a", PackageStatus::Ok, None);
        log.record_package("b", PackageStatus::Failed, Some("no valid destination"));
        log.record_package("c", PackageStatus::NotFound, None);
        assert_eq!(log.failure_count(), 1);
    }

    #[test]
    fn has_failures_only_counts_failed_entries() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_package("dots/vim", PackageStatus::Skipped, None);
        log.record_package("dots/ghost", PackageStatus::NotFound, None);
        assert!(!log.has_failures());
        log.record_package("dots", PackageStatus::Failed, Some("destination inaccessible"));
        assert!(log.has_failures());
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_package("via-trait", PackageStatus::Ok, None);
        assert_eq!(log.package_entries().len(), 1);
    }

    #[test]
    fn log_file_is_created() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().expect("log path should exist");
        assert!(path.exists(), "log file should exist once the file layer is set up");
    }

    #[test]
    fn events_are_tagged_in_log_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("marker-{}", std::process::id());
        log.stage(&format!("stage-{marker}"));
        log.dry_run(&format!("dry-{marker}"));
        log.warn(&format!("warn-{marker}"));
        log.error(&format!("error-{marker}"));
        log.debug(&format!("debug-{marker}"));

        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains(&format!("==> stage-{marker}")));
        assert!(contents.contains(&format!("[dry run] dry-{marker}")));
        assert!(contents.contains(&format!("[warn] warn-{marker}")));
        assert!(contents.contains(&format!("[error] error-{marker}")));
        assert!(contents.contains(&format!("debug-{marker}")));
    }

    #[test]
    fn ansi_codes_are_stripped_from_log_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.info("\x1b[32mStowed\x1b[0m a ➡ b");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("Stowed a ➡ b"));
        assert!(!contents.contains('\x1b'));
    }
}
