//! Buffer edits that resolve a hunk.
//!
//! Removed lines stay in the preview buffer until their hunk is resolved
//! (only a deletion highlight marks them), so every hunk kind is resolved
//! the same way: delete the side that loses and keep the side that wins.
//!
//! | hunk     | accept                        | reject                          |
//! |----------|-------------------------------|---------------------------------|
//! | Removed  | delete its lines              | keep its lines                  |
//! | Added    | keep its lines                | delete its lines                |
//! | Modified | span becomes the added lines  | span becomes the removed lines  |

use crate::models::{Decision, Hunk, TextEdit};

/// The edit (if any) that resolves a hunk, and how many lines it removes
/// from the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkResolution {
    pub edit: Option<TextEdit>,
    /// Lines the buffer loses; later hunks move up by this much.
    pub line_delta: usize,
}

pub fn resolution(hunk: &Hunk, decision: Decision) -> HunkResolution {
    match (hunk, decision) {
        (Hunk::Removed(_), Decision::Reject) | (Hunk::Added(_), Decision::Accept) => HunkResolution {
            edit: None,
            line_delta: 0,
        },
        (Hunk::Removed(block), Decision::Accept) | (Hunk::Added(block), Decision::Reject) => {
            HunkResolution {
                edit: Some(TextEdit::delete(block.range())),
                line_delta: block.count,
            }
        }
        (Hunk::Modified { removed, added }, Decision::Accept) => HunkResolution {
            edit: Some(TextEdit::replace(hunk.span(), added.lines())),
            line_delta: removed.count,
        },
        (Hunk::Modified { removed, added }, Decision::Reject) => HunkResolution {
            edit: Some(TextEdit::replace(hunk.span(), removed.lines())),
            line_delta: added.count,
        },
    }
}

/// Edits resolving every hunk with the same decision, last hunk first.
pub fn batch_edits(hunks: &[Hunk], decision: Decision) -> Vec<TextEdit> {
    hunks
        .iter()
        .rev()
        .filter_map(|hunk| resolution(hunk, decision).edit)
        .collect()
}
