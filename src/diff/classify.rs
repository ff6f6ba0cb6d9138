//! Classify line-diff runs into reviewable hunks.
//!
//! Line numbers are positions in the preview buffer, where every run's lines
//! are present in order. A removal directly followed by an addition becomes
//! one `Modified` hunk; any unchanged run in between breaks the pairing.

use crate::models::{DiffRun, Hunk, LineBlock};

/// Convert runs into hunks in ascending line order.
///
/// A run flagged as both added and removed cannot be interpreted and is
/// treated as unchanged.
pub fn classify(runs: &[DiffRun]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut pending_removal: Option<LineBlock> = None;
    let mut cursor = 0;

    for (i, run) in runs.iter().enumerate() {
        let block = LineBlock::new(cursor, run.count, run.value.clone());
        let is_last = i + 1 == runs.len();

        match (run.removed, run.added) {
            (true, false) => {
                if let Some(previous) = pending_removal.take() {
                    hunks.push(Hunk::Removed(previous));
                }
                if is_last {
                    hunks.push(Hunk::Removed(block));
                } else {
                    pending_removal = Some(block);
                }
            }
            (false, true) => match pending_removal.take() {
                Some(removed) => hunks.push(Hunk::Modified {
                    removed,
                    added: block,
                }),
                None => hunks.push(Hunk::Added(block)),
            },
            _ => {
                if let Some(removed) = pending_removal.take() {
                    hunks.push(Hunk::Removed(removed));
                }
            }
        }

        cursor += run.count;
    }

    hunks
}
