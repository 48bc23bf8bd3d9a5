//! Discovery of the files a package links.
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::filter::FileFilter;
use super::outcome::LinkCandidate;
use super::tags::{RenameHints, effective_name};
use crate::paths::normalize;

/// Walk `source_root` and plan one link per surviving file.
///
/// The walk is pre-order and follows symbolic links to directories. Within a
/// directory, files are visited before sub-directories and each group is
/// sorted by name, so the returned order is deterministic. A source root
/// that cannot be read yields no candidates.
#[must_use]
pub fn collect(
    source_root: &Path,
    destination_root: &Path,
    host_tag: &str,
    include: &[String],
    exclude: &[String],
) -> Vec<LinkCandidate> {
    let mut walk = Walk {
        destination_root,
        host_tag,
        filter: FileFilter::new(include, exclude),
        ancestors: Vec::new(),
        found: Vec::new(),
    };
    walk.visit(source_root, Path::new(""), &RenameHints::new());
    tracing::debug!(
        "planned {} link(s) from {}",
        walk.found.len(),
        source_root.display()
    );
    walk.found
}

struct Walk<'a> {
    destination_root: &'a Path,
    host_tag: &'a str,
    filter: FileFilter<'a>,
    /// Canonical paths of the directories currently being visited.
    ancestors: Vec<PathBuf>,
    found: Vec<LinkCandidate>,
}

struct Entry {
    name: OsString,
    path: PathBuf,
    is_dir: bool,
}

impl Walk<'_> {
    fn visit(&mut self, dir: &Path, rel: &Path, hints: &RenameHints) {
        let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if self.ancestors.contains(&canonical) {
            tracing::debug!("not re-entering {} (symlink cycle)", dir.display());
            return;
        }

        let mut entries = match read_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("cannot read {}: {e}", dir.display());
                return;
            }
        };
        entries.sort_by(|a, b| a.is_dir.cmp(&b.is_dir).then_with(|| a.name.cmp(&b.name)));

        self.ancestors.push(canonical);
        for entry in entries {
            let Some(effective) = effective_name(&entry.name, self.host_tag) else {
                tracing::debug!("{} is not meant for this host", entry.path.display());
                continue;
            };
            let entry_rel = rel.join(&entry.name);

            if entry.is_dir {
                let child_hints = if effective == entry.name {
                    hints.clone()
                } else {
                    hints.extend(&entry.name, &effective)
                };
                self.visit(&entry.path, &entry_rel, &child_hints);
            } else if self.filter.accepts(&entry_rel) {
                let destination = self
                    .destination_root
                    .join(hints.apply(rel))
                    .join(&effective);
                self.found
                    .push(LinkCandidate::new(entry.path, normalize(&destination)));
            }
        }
        self.ancestors.pop();
    }
}

/// List `dir`; entries pointing at directories (directly or through a
/// symbolic link) are marked as such, everything else counts as a file.
fn read_entries(dir: &Path) -> std::io::Result<Vec<Entry>> {
    fs::read_dir(dir)?
        .map(|entry| {
            let entry = entry?;
            let path = entry.path();
            let is_dir = fs::metadata(&path).is_ok_and(|m| m.is_dir());
            Ok(Entry {
                name: entry.file_name(),
                path,
                is_dir,
            })
        })
        .collect()
}
