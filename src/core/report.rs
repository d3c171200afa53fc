//! Per-plugin outcomes and batch-level result aggregation.

use crate::error::{Result, VimpackError};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Terminal state of one plugin in one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Installed,
    Updated {
        before: String,
        after: String,
        messages: Vec<String>,
    },
    UpToDate,
    /// Skipped without a backend call because the plugin is frozen.
    Frozen,
    Moved {
        from: PathBuf,
        to: PathBuf,
    },
    Failed {
        errors: Vec<String>,
    },
}

impl Outcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            errors: vec![reason.into()],
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Did this outcome change the plugin's on-disk content or location?
    pub fn changed(&self) -> bool {
        matches!(self, Self::Installed | Self::Updated { .. } | Self::Moved { .. })
    }

    /// Commit count derived from the change-log message lines.
    pub fn commit_count(&self) -> usize {
        match self {
            Self::Updated { messages, .. } => messages.len(),
            _ => 0,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Installed => "installed".to_string(),
            Self::Updated { messages, .. } => {
                format!("updated ({} commits)", messages.len())
            }
            Self::UpToDate => "already up to date".to_string(),
            Self::Frozen => "frozen, skipped".to_string(),
            Self::Moved { from, to } => {
                format!("moved {} -> {}", from.display(), to.display())
            }
            Self::Failed { errors } => match errors.first() {
                Some(first) => format!("failed: {}", first),
                None => "failed".to_string(),
            },
        }
    }
}

/// One stage's results, keyed by plugin name.
pub type Report = BTreeMap<String, Outcome>;

/// Disjoint-key union of two stage reports. A shared key means the same
/// plugin was processed twice in one batch, which is a bug, not a race to
/// resolve silently.
pub fn merge(mut left: Report, right: Report) -> Result<Report> {
    for (name, outcome) in right {
        if left.contains_key(&name) {
            return Err(VimpackError::ReportConflict { plugin: name });
        }
        left.insert(name, outcome);
    }
    Ok(left)
}

/// Accumulates stage results across a batch and produces the final report.
///
/// Removals are a plain path list rather than a keyed map: a dirty plugin
/// can be removed by clean and reinstalled by install in the same batch,
/// and those two records must not collide.
#[derive(Debug, Default)]
pub struct Aggregator {
    pub moves: Report,
    pub installs: Report,
    pub updates: Report,
    pub removed: Vec<PathBuf>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugins eligible for helptags regeneration: changed, with no
    /// recorded error. Moves count as changes (the worked reconciliation
    /// example regenerates docs for a re-homed plugin).
    pub fn doc_eligible(&self) -> Vec<String> {
        let mut names = Vec::new();
        for report in [&self.moves, &self.installs, &self.updates] {
            for (name, outcome) in report.iter() {
                if outcome.changed() && !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Merge the keyed stage reports; collision is batch-fatal.
    pub fn finish(self) -> Result<Report> {
        let merged = merge(self.moves, self.installs)?;
        merge(merged, self.updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(entries: &[(&str, Outcome)]) -> Report {
        entries
            .iter()
            .map(|(n, o)| (n.to_string(), o.clone()))
            .collect()
    }

    #[test]
    fn merge_is_disjoint_union() {
        let a = report(&[("fzf", Outcome::Installed)]);
        let b = report(&[("fugitive", Outcome::UpToDate)]);
        let merged = merge(a, b).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_fails_loudly_on_key_collision() {
        let a = report(&[("fzf", Outcome::Installed)]);
        let b = report(&[("fzf", Outcome::UpToDate)]);
        let err = merge(a, b).unwrap_err();
        assert!(matches!(
            err,
            VimpackError::ReportConflict { plugin } if plugin == "fzf"
        ));
    }

    #[test]
    fn doc_eligibility_excludes_failures_and_no_ops() {
        let mut agg = Aggregator::new();
        agg.installs = report(&[
            ("a", Outcome::Installed),
            ("b", Outcome::failed("clone failed")),
        ]);
        agg.updates = report(&[
            (
                "c",
                Outcome::Updated {
                    before: "1".into(),
                    after: "2".into(),
                    messages: vec!["fix".into()],
                },
            ),
            ("d", Outcome::UpToDate),
            ("e", Outcome::Frozen),
        ]);
        agg.moves = report(&[(
            "f",
            Outcome::Moved {
                from: "/p/opt/f".into(),
                to: "/p/start/f".into(),
            },
        )]);

        let eligible = agg.doc_eligible();
        assert_eq!(eligible, vec!["f", "a", "c"]);
    }

    #[test]
    fn commit_count_comes_from_message_lines() {
        let outcome = Outcome::Updated {
            before: "aaa".into(),
            after: "bbb".into(),
            messages: vec!["one".into(), "two".into(), "three".into()],
        };
        assert_eq!(outcome.commit_count(), 3);
        assert_eq!(outcome.summary(), "updated (3 commits)");
    }

    #[test]
    fn finish_detects_cross_stage_collision() {
        let mut agg = Aggregator::new();
        agg.installs = report(&[("x", Outcome::Installed)]);
        agg.updates = report(&[("x", Outcome::UpToDate)]);
        assert!(agg.finish().is_err());
    }
}
