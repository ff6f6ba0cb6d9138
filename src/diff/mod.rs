//! Diff engine: line diffing, hunk classification, and preview buffers.

pub mod classify;
pub mod lines;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::editor::split_lines;
use crate::models::{DiffRun, Eol, Hunk};

pub use classify::classify;
pub use lines::diff_lines;

/// Line-diff algorithm.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<DiffAlgorithm> for similar::Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => similar::Algorithm::Myers,
            DiffAlgorithm::Patience => similar::Algorithm::Patience,
            DiffAlgorithm::Lcs => similar::Algorithm::Lcs,
        }
    }
}

/// Knobs for the line diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub algorithm: DiffAlgorithm,
    /// Give up on a minimal diff after this long; the result stays valid
    /// but may be coarser.
    pub timeout: Option<Duration>,
}

/// Everything needed to put a proposal under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPlan {
    pub eol: Eol,
    /// Proposed content after EOL normalization.
    pub modified: String,
    /// Original and proposed lines interleaved in run order.
    pub preview: Vec<String>,
    pub hunks: Vec<Hunk>,
}

impl ReviewPlan {
    /// Diff `current` against `proposed`.
    ///
    /// The proposal is normalized to the EOL of `current` first.
    pub fn build(current: &str, proposed: &str, options: &DiffOptions) -> Self {
        let eol = Eol::detect(current);
        let old_lines = split_lines(current);
        let new_lines = split_lines(proposed);
        let modified = new_lines.join(eol.as_str());

        let runs = diff_lines(&old_lines, &new_lines, eol, options);
        let preview = preview_lines(&runs);
        let hunks = classify(&runs);

        Self {
            eol,
            modified,
            preview,
            hunks,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.hunks.is_empty()
    }
}

/// Lines of every run in order: the buffer shown while reviewing.
pub fn preview_lines(runs: &[DiffRun]) -> Vec<String> {
    runs.iter().flat_map(DiffRun::lines).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HunkKind, LineBlock};
    use pretty_assertions::assert_eq;

    #[test]
    fn algorithm_parses_from_config_strings() {
        assert_eq!("patience".parse::<DiffAlgorithm>().unwrap(), DiffAlgorithm::Patience);
        assert_eq!("LCS".parse::<DiffAlgorithm>().unwrap(), DiffAlgorithm::Lcs);
        assert!("histogram".parse::<DiffAlgorithm>().is_err());
    }

    #[test]
    fn plan_for_interleaved_edits() {
        let plan = ReviewPlan::build("a\nb\nc\nd\ne", "a\na1\nb\nc1\ne\nf", &DiffOptions::default());

        assert_eq!(plan.preview, vec!["a", "a1", "b", "c", "d", "c1", "e", "f"]);
        let kinds: Vec<_> = plan.hunks.iter().map(Hunk::kind).collect();
        assert_eq!(kinds, vec![HunkKind::Added, HunkKind::Modified, HunkKind::Added]);
        assert_eq!(
            plan.hunks[1],
            Hunk::Modified {
                removed: LineBlock::new(3, 2, "c\nd"),
                added: LineBlock::new(5, 1, "c1"),
            }
        );
        assert_eq!(plan.hunks[2], Hunk::Added(LineBlock::new(7, 1, "f")));
    }

    #[test]
    fn proposal_is_normalized_to_document_eol() {
        let plan = ReviewPlan::build("a\r\nb", "a\nc", &DiffOptions::default());
        assert_eq!(plan.eol, Eol::CrLf);
        assert_eq!(plan.modified, "a\r\nc");
        assert_eq!(
            plan.hunks,
            vec![Hunk::Modified {
                removed: LineBlock::new(1, 1, "b"),
                added: LineBlock::new(2, 1, "c"),
            }]
        );
    }

    #[test]
    fn identical_content_is_unchanged() {
        let plan = ReviewPlan::build("same\ntext", "same\r\ntext", &DiffOptions::default());
        assert!(plan.is_unchanged());
    }

    #[test]
    fn new_file_replaces_the_empty_line() {
        let plan = ReviewPlan::build("", "x\ny", &DiffOptions::default());
        assert_eq!(plan.preview, vec!["", "x", "y"]);
        assert_eq!(
            plan.hunks,
            vec![Hunk::Modified {
                removed: LineBlock::new(0, 1, ""),
                added: LineBlock::new(1, 2, "x\ny"),
            }]
        );
    }
}
