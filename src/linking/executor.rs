//! Symbolic link creation as a bounded state machine.
//!
//! Each candidate runs through the transitions below until it reaches a
//! terminal state. Every retry removes the cause of the previous failure, so
//! a candidate normally settles within five transitions.
//!
//! | state         | event                               | next                       |
//! |---------------|-------------------------------------|----------------------------|
//! | Attempting    | link created / dry run: nothing there | Done                     |
//! | Attempting    | parent directory missing            | ParentMissing              |
//! | Attempting    | destination occupied                | EntryExists                |
//! | ParentMissing | parent tree created                 | Attempting                 |
//! | EntryExists   | symbolic link, or file + overwrite  | Attempting (dry run: Done) |
//! | EntryExists   | file without overwrite / directory  | Skipped                    |
//! | any           | permission or other I/O failure     | Skipped                    |
use std::io;
use std::path::{Path, PathBuf};

use super::outcome::{LinkCandidate, LinkOutcome, RunResult};
use crate::error::SkipReason;
use crate::operations::{EntryKind, LinkFs, SystemLinkFs};
use crate::paths::relative_path;

/// Upper bound on transitions per candidate before it is given up on.
pub const MAX_TRANSITIONS: usize = 8;

/// Link every candidate on the real filesystem.
#[must_use]
pub fn create(candidates: Vec<LinkCandidate>, dry_run: bool, overwrite: bool) -> RunResult {
    Executor::new(SystemLinkFs, dry_run, overwrite).run(candidates)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Attempting,
    ParentMissing,
    EntryExists,
    Skipped(SkipReason),
    Done,
}

/// Runs the link state machine over a [`LinkFs`].
#[derive(Debug)]
pub struct Executor<F> {
    fs: F,
    dry_run: bool,
    overwrite: bool,
}

impl<F: LinkFs> Executor<F> {
    /// Create an executor.
    pub const fn new(fs: F, dry_run: bool, overwrite: bool) -> Self {
        Self {
            fs,
            dry_run,
            overwrite,
        }
    }

    /// Process `candidates` in order and collect their outcomes.
    ///
    /// In dry-run mode the filesystem is only inspected, never changed.
    pub fn run(&self, candidates: Vec<LinkCandidate>) -> RunResult {
        let mut result = RunResult::new(candidates.clone());
        for candidate in candidates {
            match self.link(&candidate) {
                Ok(outcome) => {
                    tracing::debug!(
                        "{outcome}: {} -> {}",
                        candidate.source.display(),
                        candidate.destination.display()
                    );
                    result.record(candidate, outcome);
                }
                Err(reason) => {
                    tracing::debug!("skipped {}: {reason}", candidate.destination.display());
                    result.record_skip(candidate, reason);
                }
            }
        }
        result
    }

    fn link(&self, candidate: &LinkCandidate) -> Result<LinkOutcome, SkipReason> {
        let dest = candidate.destination.as_path();
        let target = self.link_target(candidate);
        let mut outcome = LinkOutcome::Stowed;
        let mut state = State::Attempting;

        for _ in 0..MAX_TRANSITIONS {
            state = match state {
                State::Done => return Ok(outcome),
                State::Skipped(reason) => return Err(reason),
                State::Attempting => self.attempt(&target, dest),
                State::ParentMissing => self.create_parent(dest),
                State::EntryExists => self.resolve_conflict(dest, &mut outcome),
            };
        }

        match state {
            State::Done => Ok(outcome),
            State::Skipped(reason) => Err(reason),
            _ => {
                tracing::error!(
                    "link for {} did not settle after {MAX_TRANSITIONS} transitions",
                    dest.display()
                );
                Err(SkipReason::RetryLimit)
            }
        }
    }

    /// Absolute source when the destination's parent, or any ancestor of it
    /// that the source does not share, is a symbolic link. Otherwise the
    /// source relative to that parent.
    fn link_target(&self, candidate: &LinkCandidate) -> PathBuf {
        let Some(parent) = candidate.destination.parent() else {
            return candidate.source.clone();
        };
        let through_link = parent
            .ancestors()
            .take_while(|dir| !candidate.source.starts_with(dir))
            .any(|dir| matches!(self.fs.entry_kind(dir), Ok(Some(EntryKind::Symlink))));
        if through_link {
            candidate.source.clone()
        } else {
            relative_path(&candidate.source, parent)
        }
    }

    fn attempt(&self, target: &Path, dest: &Path) -> State {
        if self.dry_run {
            return match self.fs.entry_kind(dest) {
                Ok(None) => State::Done,
                Ok(Some(_)) => State::EntryExists,
                Err(e) => failure("inspect destination", &e),
            };
        }
        match self.fs.symlink(target, dest) {
            Ok(()) => State::Done,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => State::EntryExists,
            Err(e) if e.kind() == io::ErrorKind::NotFound => State::ParentMissing,
            Err(e) => failure("create link", &e),
        }
    }

    fn create_parent(&self, dest: &Path) -> State {
        let Some(parent) = dest.parent() else {
            return State::Skipped(SkipReason::Io {
                operation: "create parent directory",
                message: "destination has no parent".to_string(),
            });
        };
        match self.fs.create_dir_all(parent) {
            Ok(()) => State::Attempting,
            Err(e) => failure("create parent directory", &e),
        }
    }

    fn resolve_conflict(&self, dest: &Path, outcome: &mut LinkOutcome) -> State {
        let kind = match self.fs.entry_kind(dest) {
            Ok(Some(kind)) => kind,
            // Gone since the last attempt
            Ok(None) => return State::Attempting,
            Err(e) => return failure("inspect destination", &e),
        };
        *outcome = match kind {
            EntryKind::Symlink => LinkOutcome::Restowed,
            EntryKind::File if self.overwrite => LinkOutcome::Replaced,
            EntryKind::File => return State::Skipped(SkipReason::Conflict),
            EntryKind::Directory => return State::Skipped(SkipReason::Directory),
        };
        if self.dry_run {
            return State::Done;
        }
        match self.fs.remove(dest) {
            Ok(()) => State::Attempting,
            Err(e) => failure("remove existing entry", &e),
        }
    }
}

fn failure(operation: &'static str, error: &io::Error) -> State {
    State::Skipped(if error.kind() == io::ErrorKind::PermissionDenied {
        SkipReason::PermissionDenied { operation }
    } else {
        SkipReason::Io {
            operation,
            message: error.to_string(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::MockLinkFs;
    use mockall::predicate::eq;
    use std::fs;

    fn denied() -> io::Error {
        io::Error::from(io::ErrorKind::PermissionDenied)
    }

    fn candidate() -> LinkCandidate {
        LinkCandidate::new("/dots/vim/.vimrc", "/home/u/.vimrc")
    }

    // -----------------------------------------------------------------------
    // State machine (mocked filesystem)
    // -----------------------------------------------------------------------

    #[test]
    fn permission_denied_on_link_is_skipped_without_retry() {
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind()
            .returning(|_| Ok(Some(EntryKind::Directory)));
        fs.expect_symlink().times(1).returning(|_, _| Err(denied()));

        let result = Executor::new(fs, false, false).run(vec![candidate()]);
        assert_eq!(result.bucket(LinkOutcome::Skipped), [candidate()]);
        assert_eq!(
            result.reason_for(&candidate()),
            Some(&SkipReason::PermissionDenied {
                operation: "create link"
            })
        );
    }

    #[test]
    fn permission_denied_on_remove_is_skipped() {
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind()
            .with(eq(Path::new("/home/u/.vimrc")))
            .returning(|_| Ok(Some(EntryKind::Symlink)));
        fs.expect_entry_kind()
            .withf(|path| path != Path::new("/home/u/.vimrc"))
            .returning(|_| Ok(Some(EntryKind::Directory)));
        fs.expect_symlink()
            .times(1)
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::AlreadyExists)));
        fs.expect_remove().times(1).returning(|_| Err(denied()));

        let result = Executor::new(fs, false, true).run(vec![candidate()]);
        assert_eq!(
            result.reason_for(&candidate()),
            Some(&SkipReason::PermissionDenied {
                operation: "remove existing entry"
            })
        );
    }

    #[test]
    fn permission_denied_creating_parent_is_skipped() {
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind().returning(|_| Ok(None));
        fs.expect_symlink()
            .times(1)
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::NotFound)));
        fs.expect_create_dir_all().times(1).returning(|_| Err(denied()));

        let result = Executor::new(fs, false, false).run(vec![candidate()]);
        assert_eq!(result.bucket(LinkOutcome::Skipped).len(), 1);
    }

    #[test]
    fn missing_parent_is_created_and_link_retried() {
        let mut fs = MockLinkFs::new();
        let mut seq = mockall::Sequence::new();
        fs.expect_entry_kind().returning(|_| Ok(None));
        fs.expect_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::NotFound)));
        fs.expect_create_dir_all()
            .with(eq(Path::new("/home/u")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        fs.expect_symlink()
            .with(eq(Path::new("../../dots/vim/.vimrc")), eq(Path::new("/home/u/.vimrc")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let result = Executor::new(fs, false, false).run(vec![candidate()]);
        assert_eq!(result.bucket(LinkOutcome::Stowed), [candidate()]);
    }

    #[test]
    fn non_converging_link_hits_the_retry_limit() {
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind().returning(|_| Ok(Some(EntryKind::Symlink)));
        fs.expect_symlink()
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::AlreadyExists)));
        fs.expect_remove().returning(|_| Ok(()));

        let result = Executor::new(fs, false, false).run(vec![candidate()]);
        assert_eq!(result.reason_for(&candidate()), Some(&SkipReason::RetryLimit));
    }

    #[test]
    fn dry_run_only_inspects() {
        // No symlink / remove / create_dir_all expectations: any call panics
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind()
            .with(eq(Path::new("/home/u/.vimrc")))
            .returning(|_| Ok(Some(EntryKind::File)));
        fs.expect_entry_kind()
            .withf(|path| path != Path::new("/home/u/.vimrc"))
            .returning(|_| Ok(Some(EntryKind::Directory)));

        let result = Executor::new(fs, true, true).run(vec![candidate()]);
        assert_eq!(result.bucket(LinkOutcome::Replaced), [candidate()]);
    }

    #[test]
    fn symlinked_parent_gets_absolute_target() {
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind()
            .with(eq(Path::new("/home/u")))
            .returning(|_| Ok(Some(EntryKind::Symlink)));
        fs.expect_symlink()
            .with(eq(Path::new("/dots/vim/.vimrc")), eq(Path::new("/home/u/.vimrc")))
            .times(1)
            .returning(|_, _| Ok(()));

        let result = Executor::new(fs, false, false).run(vec![candidate()]);
        assert_eq!(result.bucket(LinkOutcome::Stowed).len(), 1);
    }

    #[test]
    fn symlinked_ancestor_gets_absolute_target() {
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind()
            .with(eq(Path::new("/home/u/.config")))
            .returning(|_| Ok(Some(EntryKind::Symlink)));
        fs.expect_entry_kind()
            .withf(|path| path != Path::new("/home/u/.config"))
            .returning(|_| Ok(Some(EntryKind::Directory)));
        fs.expect_symlink()
            .with(
                eq(Path::new("/dots/app/settings")),
                eq(Path::new("/home/u/.config/app/settings")),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let candidate = LinkCandidate::new("/dots/app/settings", "/home/u/.config/app/settings");
        let result = Executor::new(fs, false, false).run(vec![candidate]);
        assert_eq!(result.bucket(LinkOutcome::Stowed).len(), 1);
    }

    #[test]
    fn ancestors_shared_with_the_source_are_not_inspected() {
        let mut fs = MockLinkFs::new();
        fs.expect_entry_kind()
            .with(eq(Path::new("/home/u/.config")))
            .times(1)
            .returning(|_| Ok(Some(EntryKind::Directory)));
        fs.expect_symlink()
            .with(eq(Path::new("../dots/a")), eq(Path::new("/home/u/.config/a")))
            .times(1)
            .returning(|_, _| Ok(()));

        let candidate = LinkCandidate::new("/home/u/dots/a", "/home/u/.config/a");
        let result = Executor::new(fs, false, false).run(vec![candidate]);
        assert_eq!(result.bucket(LinkOutcome::Stowed).len(), 1);
    }

    // -----------------------------------------------------------------------
    // Real filesystem
    // -----------------------------------------------------------------------

    struct Tree {
        _dir: tempfile::TempDir,
        src: PathBuf,
        dest: PathBuf,
    }

    fn tree(files: &[&str]) -> Tree {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let src = root.join("dots");
        let dest = root.join("home");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        for f in files {
            fs::write(src.join(f), f).unwrap();
        }
        Tree {
            _dir: dir,
            src,
            dest,
        }
    }

    fn plan(t: &Tree, names: &[&str]) -> Vec<LinkCandidate> {
        names
            .iter()
            .map(|n| LinkCandidate::new(t.src.join(n), t.dest.join(n)))
            .collect()
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, String)> {
        let mut out = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                let meta = fs::symlink_metadata(&path).unwrap();
                let detail = if meta.file_type().is_symlink() {
                    format!("-> {}", fs::read_link(&path).unwrap().display())
                } else if meta.is_dir() {
                    stack.push(path.clone());
                    "dir".to_string()
                } else {
                    fs::read_to_string(&path).unwrap()
                };
                out.push((path, detail));
            }
        }
        out.sort();
        out
    }

    #[cfg(unix)]
    #[test]
    fn second_run_restows_everything() {
        let t = tree(&["a", "b"]);
        let first = create(plan(&t, &["a", "b"]), false, false);
        assert_eq!(first.bucket(LinkOutcome::Stowed).len(), 2);
        assert_eq!(
            fs::read_link(t.dest.join("a")).unwrap(),
            PathBuf::from("../dots/a")
        );

        let second = create(plan(&t, &["a", "b"]), false, false);
        assert_eq!(second.bucket(LinkOutcome::Restowed), plan(&t, &["a", "b"]));
        assert_eq!(fs::read_to_string(t.dest.join("b")).unwrap(), "b");
    }

    #[cfg(unix)]
    #[test]
    fn plain_file_without_overwrite_is_untouched() {
        let t = tree(&["a"]);
        fs::write(t.dest.join("a"), "mine").unwrap();

        let result = create(plan(&t, &["a"]), false, false);
        assert_eq!(result.bucket(LinkOutcome::Skipped).len(), 1);
        assert_eq!(result.reason_for(&plan(&t, &["a"])[0]), Some(&SkipReason::Conflict));
        assert_eq!(fs::read_to_string(t.dest.join("a")).unwrap(), "mine");
    }

    #[cfg(unix)]
    #[test]
    fn plain_file_with_overwrite_is_replaced() {
        let t = tree(&["a"]);
        fs::write(t.dest.join("a"), "mine").unwrap();

        let result = create(plan(&t, &["a"]), false, true);
        assert_eq!(result.bucket(LinkOutcome::Replaced).len(), 1);
        assert!(fs::symlink_metadata(t.dest.join("a")).unwrap().file_type().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn directory_at_destination_is_never_removed() {
        let t = tree(&["a"]);
        fs::create_dir(t.dest.join("a")).unwrap();

        let result = create(plan(&t, &["a"]), false, true);
        assert_eq!(result.reason_for(&plan(&t, &["a"])[0]), Some(&SkipReason::Directory));
        assert!(t.dest.join("a").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn nested_destination_parents_are_created() {
        let t = tree(&["a"]);
        let candidate = LinkCandidate::new(t.src.join("a"), t.dest.join(".config/app/a"));

        let result = create(vec![candidate.clone()], false, false);
        assert_eq!(result.outcome_of(&candidate), Some(LinkOutcome::Stowed));
        assert_eq!(fs::read_to_string(&candidate.destination).unwrap(), "a");
    }

    #[cfg(unix)]
    #[test]
    fn link_below_symlinked_directory_resolves() {
        let t = tree(&["settings"]);
        let elsewhere = t.dest.parent().unwrap().join("elsewhere");
        fs::create_dir_all(elsewhere.join("app")).unwrap();
        std::os::unix::fs::symlink(&elsewhere, t.dest.join(".config")).unwrap();
        let candidate =
            LinkCandidate::new(t.src.join("settings"), t.dest.join(".config/app/settings"));

        let result = create(vec![candidate.clone()], false, false);
        assert_eq!(result.outcome_of(&candidate), Some(LinkOutcome::Stowed));
        assert_eq!(fs::read_link(&candidate.destination).unwrap(), t.src.join("settings"));
        assert_eq!(fs::read_to_string(&candidate.destination).unwrap(), "settings");
    }

    #[cfg(unix)]
    #[test]
    fn dry_run_leaves_the_tree_alone() {
        let t = tree(&["a", "b", "c"]);
        fs::write(t.dest.join("b"), "mine").unwrap();
        std::os::unix::fs::symlink("elsewhere", t.dest.join("c")).unwrap();
        let mut candidates = plan(&t, &["a", "b", "c"]);
        candidates.push(LinkCandidate::new(t.src.join("a"), t.dest.join("new/dir/a")));

        let before = snapshot(t.dest.parent().unwrap());
        let result = create(candidates, true, true);
        assert_eq!(snapshot(t.dest.parent().unwrap()), before);

        assert_eq!(result.bucket(LinkOutcome::Stowed).len(), 2);
        assert_eq!(result.bucket(LinkOutcome::Replaced).len(), 1);
        assert_eq!(result.bucket(LinkOutcome::Restowed).len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn buckets_keep_discovery_order() {
        let t = tree(&["c", "a", "b"]);
        let candidates = plan(&t, &["c", "a", "b"]);
        let result = create(candidates.clone(), false, false);
        assert_eq!(result.files, candidates);
        assert_eq!(result.bucket(LinkOutcome::Stowed), candidates);
    }
}
