//! Link candidates, outcomes and the per-package run result.
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::SkipReason;

/// A `(source, destination)` pair discovered by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkCandidate {
    /// File inside the dotfiles tree.
    pub source: PathBuf,
    /// Path where the symbolic link is placed.
    pub destination: PathBuf,
}

impl LinkCandidate {
    /// Build a candidate from anything path-like.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Terminal state of one link attempt.
///
/// Variants are ordered the way reports list them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkOutcome {
    /// Nothing was at the destination; a fresh link was created.
    Stowed,
    /// A symbolic link was at the destination and was replaced.
    Restowed,
    /// A regular file was at the destination and was overwritten.
    Replaced,
    /// The destination was left untouched.
    Skipped,
}

impl LinkOutcome {
    /// Every outcome, in report order.
    pub const ALL: [Self; 4] = [Self::Stowed, Self::Restowed, Self::Replaced, Self::Skipped];

    /// Lower-case name used in statistics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stowed => "stowed",
            Self::Restowed => "restowed",
            Self::Replaced => "replaced",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one executor run over a package's candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Every candidate, in discovery order.
    pub files: Vec<LinkCandidate>,
    /// Candidates by outcome; each bucket keeps discovery order.
    pub results: BTreeMap<LinkOutcome, Vec<LinkCandidate>>,
    /// Why each skipped candidate was skipped.
    pub reasons: Vec<(LinkCandidate, SkipReason)>,
}

impl RunResult {
    /// An empty result for `files` with every outcome bucket present.
    #[must_use]
    pub fn new(files: Vec<LinkCandidate>) -> Self {
        Self {
            files,
            results: LinkOutcome::ALL.into_iter().map(|o| (o, Vec::new())).collect(),
            reasons: Vec::new(),
        }
    }

    /// Record the outcome of one candidate.
    pub fn record(&mut self, candidate: LinkCandidate, outcome: LinkOutcome) {
        self.results.entry(outcome).or_default().push(candidate);
    }

    /// Record a skipped candidate along with its reason.
    pub fn record_skip(&mut self, candidate: LinkCandidate, reason: SkipReason) {
        self.reasons.push((candidate.clone(), reason));
        self.record(candidate, LinkOutcome::Skipped);
    }

    /// Candidates that ended in `outcome`.
    #[must_use]
    pub fn bucket(&self, outcome: LinkOutcome) -> &[LinkCandidate] {
        self.results.get(&outcome).map_or(&[], Vec::as_slice)
    }

    /// Outcome assigned to `candidate`, if it was processed.
    #[must_use]
    pub fn outcome_of(&self, candidate: &LinkCandidate) -> Option<LinkOutcome> {
        LinkOutcome::ALL
            .into_iter()
            .find(|o| self.bucket(*o).contains(candidate))
    }

    /// Skip reason recorded for `candidate`.
    #[must_use]
    pub fn reason_for(&self, candidate: &LinkCandidate) -> Option<&SkipReason> {
        self.reasons
            .iter()
            .find(|(c, _)| c == candidate)
            .map(|(_, reason)| reason)
    }
}
