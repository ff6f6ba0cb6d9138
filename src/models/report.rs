//! Command results handed to the output renderers.

use serde::Serialize;

use super::{Eol, Hunk, HunkKind};

/// Counts over a set of hunks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub hunks: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl ReviewSummary {
    pub fn from_hunks(hunks: &[Hunk]) -> Self {
        let mut summary = Self {
            hunks: hunks.len(),
            ..Self::default()
        };
        for hunk in hunks {
            match hunk.kind() {
                HunkKind::Added => summary.added += 1,
                HunkKind::Removed => summary.removed += 1,
                HunkKind::Modified => summary.modified += 1,
            }
            let (removed, added) = hunk.line_counts();
            summary.lines_removed += removed;
            summary.lines_added += added;
        }
        summary
    }
}

/// Hunks a proposal would put under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewReport {
    pub file: String,
    pub eol: Eol,
    pub hunks: Vec<Hunk>,
    pub summary: ReviewSummary,
}

impl PreviewReport {
    pub fn new(file: impl Into<String>, eol: Eol, hunks: Vec<Hunk>) -> Self {
        let summary = ReviewSummary::from_hunks(&hunks);
        Self {
            file: file.into(),
            eol,
            hunks,
            summary,
        }
    }
}

/// Decisions taken by a non-interactive review, by initial hunk index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub file: String,
    /// The proposal matched the file; nothing was reviewed.
    pub unchanged: bool,
    pub accepted: Vec<usize>,
    pub rejected: Vec<usize>,
    /// Requested indices that named no hunk.
    pub skipped: Vec<usize>,
    /// The document was written back (or, for a rejected new file, discarded).
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineBlock;

    #[test]
    fn summary_counts_kinds_and_lines() {
        let hunks = vec![
            Hunk::Added(LineBlock::new(1, 1, "a1")),
            Hunk::Modified {
                removed: LineBlock::new(3, 2, "c\nd"),
                added: LineBlock::new(5, 1, "c1"),
            },
            Hunk::Removed(LineBlock::new(7, 1, "z")),
        ];
        let summary = ReviewSummary::from_hunks(&hunks);
        assert_eq!(summary.hunks, 3);
        assert_eq!((summary.added, summary.modified, summary.removed), (1, 1, 1));
        assert_eq!((summary.lines_added, summary.lines_removed), (2, 3));
    }
}
