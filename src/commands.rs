//! Library functions backing the CLI subcommands.
//!
//! Each command is a thin, non-interactive driver over the review engine so
//! it can be exercised from integration tests without spawning the binary.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::anchor::{AnchorFinder, GenerationRequest};
use crate::diff::{DiffOptions, ReviewPlan};
use crate::models::{ApplyReport, Decision, DocumentId, PreviewReport};
use crate::review::{OpenOutcome, Resolution, ReviewController, ReviewError};

/// Read a file, treating a missing one as empty (a file about to be created).
async fn read_or_empty(path: &Path) -> std::io::Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

/// Classify what `proposed` would change in `path` without touching it.
pub async fn preview_file(
    path: &Path,
    proposed: &str,
    options: &DiffOptions,
) -> std::io::Result<PreviewReport> {
    let current = read_or_empty(path).await?;
    let plan = ReviewPlan::build(&current, proposed, options);
    Ok(PreviewReport::new(
        path.display().to_string(),
        plan.eol,
        plan.hunks,
    ))
}

/// Anchor a 0-based `line` of an existing file.
pub async fn anchor_file(
    path: &Path,
    line: usize,
    finder: &AnchorFinder,
) -> std::io::Result<GenerationRequest> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(GenerationRequest::capture(
        DocumentId::file(path),
        &text,
        line,
        finder,
    ))
}

/// Decisions for a non-interactive review, keyed by initial hunk index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyPlan {
    decisions: BTreeMap<usize, Decision>,
    /// Decision for every hunk not listed explicitly.
    rest: Decision,
}

impl ApplyPlan {
    /// Build a plan, refusing an index that is both accepted and rejected.
    pub fn new(accept: &[usize], reject: &[usize], rest: Decision) -> Result<Self, String> {
        if let Some(index) = accept.iter().find(|i| reject.contains(i)) {
            return Err(format!("hunk #{index} is both accepted and rejected"));
        }
        let decisions = accept
            .iter()
            .map(|&i| (i, Decision::Accept))
            .chain(reject.iter().map(|&i| (i, Decision::Reject)))
            .collect();
        Ok(Self { decisions, rest })
    }

    pub fn decision(&self, index: usize) -> Decision {
        self.decisions.get(&index).copied().unwrap_or(self.rest)
    }

    /// Listed indices that do not name one of `len` hunks.
    pub fn out_of_range(&self, len: usize) -> Vec<usize> {
        self.decisions.keys().copied().filter(|&i| i >= len).collect()
    }
}

/// Open a review for `path` and resolve every hunk according to `plan`.
///
/// Hunks are resolved from the last to the first, so each initial index
/// still names the same hunk when its turn comes.
pub async fn apply_file(
    controller: &ReviewController,
    path: &Path,
    proposed: &str,
    plan: &ApplyPlan,
) -> Result<ApplyReport, ReviewError> {
    let mut report = ApplyReport {
        file: path.display().to_string(),
        ..ApplyReport::default()
    };

    let (doc, len) = match controller.open_review(path, proposed).await? {
        OpenOutcome::Unchanged { .. } => {
            report.unchanged = true;
            report.completed = true;
            return Ok(report);
        }
        OpenOutcome::Reviewing { doc, hunks } => (doc, hunks),
    };

    report.skipped = plan.out_of_range(len);
    if !report.skipped.is_empty() {
        warn!(doc = %doc, hunks = len, skipped = ?report.skipped, "ignoring unknown hunk indices");
    }

    for index in (0..len).rev() {
        let decision = plan.decision(index);
        let resolution = controller.resolve_hunk(&doc, index, decision).await?;
        if matches!(resolution, Resolution::Skipped(_)) {
            continue;
        }
        match decision {
            Decision::Accept => report.accepted.push(index),
            Decision::Reject => report.rejected.push(index),
        }
        if resolution == Resolution::Completed {
            report.completed = true;
        }
    }

    report.accepted.reverse();
    report.rejected.reverse();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_rejects_conflicting_indices() {
        let err = ApplyPlan::new(&[0, 2], &[2], Decision::Reject).unwrap_err();
        assert!(err.contains("#2"));
    }

    #[test]
    fn plan_falls_back_to_rest() {
        let plan = ApplyPlan::new(&[1], &[], Decision::Reject).unwrap();
        assert_eq!(plan.decision(1), Decision::Accept);
        assert_eq!(plan.decision(0), Decision::Reject);
        assert_eq!(plan.out_of_range(1), vec![1]);
        assert!(plan.out_of_range(2).is_empty());
    }

    #[tokio::test]
    async fn preview_of_missing_file_is_one_modified_hunk() {
        let dir = tempfile::tempdir().unwrap();
        let report = preview_file(&dir.path().join("new.txt"), "x\ny", &DiffOptions::default())
            .await
            .unwrap();
        assert_eq!(report.summary.modified, 1);
        assert_eq!(report.summary.lines_added, 2);
    }
}
