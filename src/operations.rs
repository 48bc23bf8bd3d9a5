//! Filesystem operations used by the link executor.
//!
//! The [`LinkFs`] trait lets the executor be unit-tested without touching the
//! real filesystem. Production code uses [`SystemLinkFs`]; tests use the
//! generated `MockLinkFs`.

use std::io;
use std::path::Path;

/// What occupies a path, without following a final symbolic link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A symbolic link, whatever it points at (or if it dangles).
    Symlink,
    /// A regular file or any other non-directory entry.
    File,
    /// A real directory.
    Directory,
}

/// Filesystem seam for link creation.
#[cfg_attr(test, mockall::automock)]
pub trait LinkFs {
    /// Inspect `path` without following it; `Ok(None)` if nothing is there.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be inspected.
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Create a symbolic link at `link` pointing to `target`.
    ///
    /// # Errors
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] if `link` is occupied and
    /// [`io::ErrorKind::NotFound`] if its parent directory is missing.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Create `path` and every missing ancestor.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove the file or symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Production [`LinkFs`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLinkFs;

impl LinkFs for SystemLinkFs {
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => Ok(Some(EntryKind::Symlink)),
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }
        #[cfg(windows)]
        {
            let resolved = link.parent().map_or_else(|| target.to_path_buf(), |p| p.join(target));
            if resolved.is_dir() {
                std::os::windows::fs::symlink_dir(target, link)
            } else {
                std::os::windows::fs::symlink_file(target, link)
            }
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}
