//! Rendering a package's [`RunResult`] into report lines and statistics.
use std::fmt;

use crate::linking::{LinkCandidate, LinkOutcome, RunResult};
use crate::paths::shrink_user;

/// How a run result is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// List every outcome, not only replaced and skipped files.
    pub dry_run: bool,
    /// Group lines by outcome instead of discovery order.
    pub group_output: bool,
    /// Append skip reasons to skipped lines.
    pub verbose: bool,
}

/// One listed link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Outcome of the link.
    pub outcome: LinkOutcome,
    /// Source path, home shrunk to `~`.
    pub source: String,
    /// Destination path, home shrunk to `~`.
    pub destination: String,
    /// Skip reason, shown in verbose mode.
    pub reason: Option<String>,
}

impl ReportLine {
    fn new(candidate: &LinkCandidate, outcome: LinkOutcome, reason: Option<String>) -> Self {
        Self {
            outcome,
            source: shrink_user(&candidate.source),
            destination: shrink_user(&candidate.destination),
            reason,
        }
    }

    /// The line with its outcome word coloured for the console.
    #[must_use]
    pub fn colored(&self) -> String {
        let color = match self.outcome {
            LinkOutcome::Stowed => "\x1b[32m",
            LinkOutcome::Restowed => "\x1b[36m",
            LinkOutcome::Replaced => "\x1b[35m",
            LinkOutcome::Skipped => "\x1b[31m",
        };
        let plain = self.to_string();
        let word = outcome_label(self.outcome);
        plain.strip_prefix(word).map_or_else(
            || plain.clone(),
            |rest| format!("{color}{word}\x1b[0m{rest}"),
        )
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ➡ {}",
            outcome_label(self.outcome),
            self.source,
            self.destination
        )?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// Rendered result of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Listed links; empty when there is nothing worth showing.
    pub lines: Vec<ReportLine>,
    /// Summary such as `2 file(s) stowed, 1 file(s) skipped`.
    pub stats: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        f.write_str(&self.stats)
    }
}

const fn outcome_label(outcome: LinkOutcome) -> &'static str {
    match outcome {
        LinkOutcome::Stowed => "Stowed",
        LinkOutcome::Restowed => "Restowed",
        LinkOutcome::Replaced => "Replaced",
        LinkOutcome::Skipped => "Skipped",
    }
}

/// Per-outcome counts, e.g. `1 file(s) stowed, 2 file(s) restowed`, or
/// `Nothing changed` when no candidate was processed.
#[must_use]
pub fn stats(result: &RunResult) -> String {
    let parts: Vec<String> = LinkOutcome::ALL
        .into_iter()
        .filter_map(|outcome| {
            let n = result.bucket(outcome).len();
            (n > 0).then(|| format!("{n} file(s) {outcome}"))
        })
        .collect();
    if parts.is_empty() {
        "Nothing changed".to_string()
    } else {
        parts.join(", ")
    }
}

/// Render `result`.
///
/// A dry run lists every bucket; a real run lists only replaced and skipped
/// files, since fresh and refreshed links are the expected result.
#[must_use]
pub fn render(result: &RunResult, options: ReportOptions) -> Report {
    let listed: &[LinkOutcome] = if options.dry_run {
        &LinkOutcome::ALL
    } else {
        &[LinkOutcome::Replaced, LinkOutcome::Skipped]
    };

    let mut entries: Vec<(&LinkCandidate, LinkOutcome)> = listed
        .iter()
        .flat_map(|outcome| result.bucket(*outcome).iter().map(move |c| (c, *outcome)))
        .collect();

    if !options.group_output {
        // Stable: bucket order breaks ties between duplicate candidates
        entries.sort_by_key(|(candidate, _)| {
            result
                .files
                .iter()
                .position(|f| f == *candidate)
                .unwrap_or(usize::MAX)
        });
    }

    let lines = entries
        .into_iter()
        .map(|(candidate, outcome)| {
            let reason = (options.verbose && outcome == LinkOutcome::Skipped)
                .then(|| result.reason_for(candidate).map(ToString::to_string))
                .flatten();
            ReportLine::new(candidate, outcome, reason)
        })
        .collect();

    Report {
        lines,
        stats: stats(result),
    }
}
