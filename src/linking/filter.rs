//! Include / exclude filtering of discovered files.
use std::path::Path;

/// Which files of a package get linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter<'a> {
    /// Every file.
    All,
    /// Only files matched by at least one rule.
    Include(&'a [String]),
    /// Every file not matched by any rule.
    Exclude(&'a [String]),
}

impl<'a> FileFilter<'a> {
    /// Build a filter from include and exclude lists.
    ///
    /// A non-empty include list takes precedence and the exclude list is
    /// then ignored.
    #[must_use]
    pub fn new(include: &'a [String], exclude: &'a [String]) -> Self {
        if !include.is_empty() {
            Self::Include(include)
        } else if !exclude.is_empty() {
            Self::Exclude(exclude)
        } else {
            Self::All
        }
    }

    /// Whether the file at `rel` (relative to the package root) is linked.
    #[must_use]
    pub fn accepts(&self, rel: &Path) -> bool {
        match self {
            Self::All => true,
            Self::Include(rules) => rules.iter().any(|rule| rule_matches(rule, rel)),
            Self::Exclude(rules) => !rules.iter().any(|rule| rule_matches(rule, rel)),
        }
    }
}

/// A rule with a `/` is a substring of the relative path; any other rule is
/// a substring of the file's base name.
fn rule_matches(rule: &str, rel: &Path) -> bool {
    if rule.contains('/') {
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        rel.contains(rule)
    } else {
        rel.file_name()
            .is_some_and(|name| name.to_string_lossy().contains(rule))
    }
}
