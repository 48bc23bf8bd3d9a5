// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed dotfiles tree, a destination home
// directory and a fluent builder for the configuration file, so each
// integration test can set up an isolated environment without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use linkthedots::config::host::HostIdentity;
use linkthedots::config::{HostOptions, loader, resolve};
use linkthedots::logging::{Log, PackageStatus};

/// An isolated dotfiles tree (`dots/`) and home (`home/`) backed by a
/// [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory holding everything.
    pub root: tempfile::TempDir,
    /// Canonical path of `dots/`.
    pub dots: PathBuf,
    /// Canonical path of `home/`.
    pub home: PathBuf,
    /// Path of the written configuration file.
    pub config: PathBuf,
}

impl IntegrationTestContext {
    /// Path relative to the dotfiles tree.
    pub fn dot(&self, rel: &str) -> PathBuf {
        self.dots.join(rel)
    }

    /// Path relative to the home directory.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    /// Load and resolve the configuration for `host`.
    pub fn resolve(&self, host: &str) -> Result<HostOptions, linkthedots::error::ConfigError> {
        let raw = loader::load(&self.config)?;
        resolve::resolve(&raw, &HostIdentity::new(host))
    }

    /// Sorted list of every entry under `home/`, with link targets and file
    /// contents, for before/after comparisons.
    pub fn snapshot_home(&self) -> Vec<(PathBuf, String)> {
        let mut out = Vec::new();
        let mut stack = vec![self.home.clone()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir).expect("read dir") {
                let path = entry.expect("dir entry").path();
                let meta = fs::symlink_metadata(&path).expect("metadata");
                let detail = if meta.file_type().is_symlink() {
                    format!("-> {}", fs::read_link(&path).expect("read link").display())
                } else if meta.is_dir() {
                    stack.push(path.clone());
                    "dir".to_string()
                } else {
                    fs::read_to_string(&path).expect("read file")
                };
                out.push((path, detail));
            }
        }
        out.sort();
        out
    }

    /// Whether `rel` under home is a symbolic link.
    pub fn is_link(&self, rel: &str) -> bool {
        fs::symlink_metadata(self.home_path(rel)).is_ok_and(|m| m.file_type().is_symlink())
    }
}

/// Fluent builder for [`IntegrationTestContext`].
///
/// `{dots}` and `{home}` in the configuration text are replaced with the
/// fixture's absolute paths.
pub struct TestContextBuilder {
    files: Vec<(String, String)>,
    home_files: Vec<(String, String)>,
    config_name: String,
    config: String,
}

impl TestContextBuilder {
    /// Begin building an empty fixture.
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            home_files: Vec::new(),
            config_name: "config.json".to_string(),
            config: r#"{"general": {}}"#.to_string(),
        }
    }

    /// Add a file to the dotfiles tree; its content is its relative path.
    pub fn dotfile(mut self, rel: &str) -> Self {
        self.files.push((rel.to_string(), rel.to_string()));
        self
    }

    /// Add a pre-existing file to the home directory.
    pub fn home_file(mut self, rel: &str, content: &str) -> Self {
        self.home_files.push((rel.to_string(), content.to_string()));
        self
    }

    /// Set the JSON configuration text.
    pub fn config(mut self, text: &str) -> Self {
        self.config = text.to_string();
        self
    }

    /// Set a TOML configuration text (written as `config.toml`).
    pub fn toml_config(mut self, text: &str) -> Self {
        self.config_name = "config.toml".to_string();
        self.config = text.to_string();
        self
    }

    /// Write everything to disk.
    pub fn build(self) -> IntegrationTestContext {
        let root = tempfile::tempdir().expect("create temp dir");
        let base = fs::canonicalize(root.path()).expect("canonical temp dir");
        let dots = base.join("dots");
        let home = base.join("home");
        fs::create_dir_all(&dots).expect("create dots");
        fs::create_dir_all(&home).expect("create home");

        for (rel, content) in &self.files {
            write(&dots, rel, content);
        }
        for (rel, content) in &self.home_files {
            write(&home, rel, content);
        }

        let config = base.join(&self.config_name);
        let text = self
            .config
            .replace("{dots}", &dots.display().to_string())
            .replace("{home}", &home.display().to_string());
        fs::write(&config, text).expect("write config");

        IntegrationTestContext {
            root,
            dots,
            home,
            config,
        }
    }
}

fn write(base: &Path, rel: &str, content: &str) {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
    fs::write(path, content).expect("write file");
}

/// A [`Log`] that keeps every message for assertions.
#[derive(Debug, Default)]
pub struct CaptureLog {
    pub lines: Mutex<Vec<String>>,
    pub packages: Mutex<Vec<(String, PackageStatus)>>,
}

impl CaptureLog {
    fn push(&self, msg: &str) {
        self.lines.lock().expect("lines").push(msg.to_string());
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .expect("lines")
            .iter()
            .any(|l| l.contains(needle))
    }

    /// Recorded package statuses, in order.
    pub fn statuses(&self) -> Vec<(String, PackageStatus)> {
        self.packages.lock().expect("packages").clone()
    }
}

impl Log for CaptureLog {
    fn stage(&self, msg: &str) {
        self.push(msg);
    }
    fn info(&self, msg: &str) {
        self.push(msg);
    }
    fn debug(&self, msg: &str) {
        self.push(msg);
    }
    fn warn(&self, msg: &str) {
        self.push(msg);
    }
    fn error(&self, msg: &str) {
        self.push(msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push(msg);
    }
    fn record_package(&self, name: &str, status: PackageStatus, _message: Option<&str>) {
        self.packages
            .lock()
            .expect("packages")
            .push((name.to_string(), status));
    }
}
