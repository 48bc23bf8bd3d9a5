//! Host-tagged file names (`name#host-a#host-b`) and rename hints.
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// Separates an effective name from the host tags in a path segment.
pub const HOST_TAG_DELIMITER: char = '#';

/// A path segment split into its effective name and host tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedName<'a> {
    /// Text before the first delimiter.
    pub effective: &'a str,
    /// Every segment after the first delimiter.
    pub tags: Vec<&'a str>,
}

impl<'a> TaggedName<'a> {
    /// Split `name` on [`HOST_TAG_DELIMITER`].
    ///
    /// ```
    /// use linkthedots::linking::tags::TaggedName;
    ///
    /// let name = TaggedName::parse("config#laptop#desktop");
    /// assert_eq!(name.effective, "config");
    /// assert_eq!(name.tags, ["laptop", "desktop"]);
    /// ```
    #[must_use]
    pub fn parse(name: &'a str) -> Self {
        let mut parts = name.split(HOST_TAG_DELIMITER);
        let effective = parts.next().unwrap_or_default();
        Self {
            effective,
            tags: parts.collect(),
        }
    }

    /// Whether this entry applies to `host_tag`: untagged, or tagged with it.
    #[must_use]
    pub fn applies_to(&self, host_tag: &str) -> bool {
        self.tags.is_empty() || self.tags.contains(&host_tag)
    }
}

/// Effective name of `name` for `host_tag`, or `None` if the entry belongs
/// to other hosts only.
///
/// Entries whose effective name is empty (`#laptop`) never apply. Names that
/// are not valid UTF-8 are treated as untagged.
#[must_use]
pub fn effective_name(name: &OsStr, host_tag: &str) -> Option<OsString> {
    let Some(text) = name.to_str() else {
        return Some(name.to_os_string());
    };
    let tagged = TaggedName::parse(text);
    (tagged.applies_to(host_tag) && !tagged.effective.is_empty())
        .then(|| OsString::from(tagged.effective))
}

/// Ordered `(tagged, effective)` directory renames collected while walking
/// down a source tree.
///
/// Each traversal frame owns its own copy; [`Self::extend`] returns a new
/// list so sibling subtrees never see each other's hints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameHints(Vec<(OsString, OsString)>);

impl RenameHints {
    /// No hints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of these hints with `(tagged, effective)` appended.
    #[must_use]
    pub fn extend(&self, tagged: &OsStr, effective: &OsStr) -> Self {
        let mut hints = self.0.clone();
        hints.push((tagged.to_os_string(), effective.to_os_string()));
        Self(hints)
    }

    /// Number of hints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no hint was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rewrite every segment of the relative path `rel`, applying the hints
    /// in the order they were recorded.
    #[must_use]
    pub fn apply(&self, rel: &Path) -> PathBuf {
        rel.components()
            .map(|component| match component {
                Component::Normal(segment) => {
                    let mut segment = segment.to_os_string();
                    for (tagged, effective) in &self.0 {
                        if segment == *tagged {
                            segment.clone_from(effective);
                        }
                    }
                    segment
                }
                other => other.as_os_str().to_os_string(),
            })
            .collect()
    }
}
