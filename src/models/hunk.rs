//! Diff-related types: line-diff runs, reviewable hunks, and line ranges.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A half-open range of whole lines: `start..start + count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub count: usize,
}

impl LineRange {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// First line past the range.
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line < self.end()
    }
}

/// Replace the lines in `range` with `lines` (no lines = pure deletion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: LineRange,
    pub lines: Vec<String>,
}

impl TextEdit {
    pub fn replace(range: LineRange, lines: Vec<String>) -> Self {
        Self { range, lines }
    }

    pub fn delete(range: LineRange) -> Self {
        Self {
            range,
            lines: Vec::new(),
        }
    }

    /// Net change in document line count once applied.
    pub fn line_delta(&self) -> isize {
        self.lines.len() as isize - self.range.count as isize
    }
}

/// One contiguous span reported by the line-diff primitive.
///
/// Exactly one of `added`/`removed` is set for a change; neither for an
/// unchanged span. `value` is the span's lines joined with the document EOL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRun {
    pub added: bool,
    pub removed: bool,
    pub count: usize,
    pub value: String,
}

impl DiffRun {
    pub fn unchanged(count: usize, value: impl Into<String>) -> Self {
        Self {
            added: false,
            removed: false,
            count,
            value: value.into(),
        }
    }

    pub fn added(count: usize, value: impl Into<String>) -> Self {
        Self {
            added: true,
            removed: false,
            count,
            value: value.into(),
        }
    }

    pub fn removed(count: usize, value: impl Into<String>) -> Self {
        Self {
            added: false,
            removed: true,
            count,
            value: value.into(),
        }
    }

    /// Lines of this run, split with the same rule as the line editor.
    pub fn lines(&self) -> Vec<String> {
        block_lines(&self.value, self.count)
    }
}

/// A block of lines inside the preview buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBlock {
    /// First line of the block in the preview buffer.
    pub line: usize,
    pub count: usize,
    /// The block's lines joined with the document EOL.
    pub value: String,
}

impl LineBlock {
    pub fn new(line: usize, count: usize, value: impl Into<String>) -> Self {
        Self {
            line,
            count,
            value: value.into(),
        }
    }

    pub fn range(&self) -> LineRange {
        LineRange::new(self.line, self.count)
    }

    pub fn lines(&self) -> Vec<String> {
        block_lines(&self.value, self.count)
    }
}

fn block_lines(value: &str, count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    crate::editor::split_lines(value)
}

/// The unit of review.
///
/// Line numbers always refer to the current preview buffer, which holds
/// removed and added lines side by side until each hunk is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Hunk {
    Removed(LineBlock),
    Added(LineBlock),
    Modified { removed: LineBlock, added: LineBlock },
}

impl Hunk {
    /// First preview line covered by the hunk.
    pub fn first_line(&self) -> usize {
        match self {
            Hunk::Removed(block) | Hunk::Added(block) => block.line,
            Hunk::Modified { removed, .. } => removed.line,
        }
    }

    /// Every preview line the hunk occupies (removed and added lines together).
    pub fn span(&self) -> LineRange {
        match self {
            Hunk::Removed(block) | Hunk::Added(block) => block.range(),
            Hunk::Modified { removed, added } => {
                LineRange::new(
                    removed.line,
                    (added.line + added.count).saturating_sub(removed.line),
                )
            }
        }
    }

    pub fn kind(&self) -> HunkKind {
        match self {
            Hunk::Removed(_) => HunkKind::Removed,
            Hunk::Added(_) => HunkKind::Added,
            Hunk::Modified { .. } => HunkKind::Modified,
        }
    }

    /// Move every line field up by `delta` lines.
    pub fn shift_up(&mut self, delta: usize) {
        match self {
            Hunk::Removed(block) | Hunk::Added(block) => {
                block.line = block.line.saturating_sub(delta);
            }
            Hunk::Modified { removed, added } => {
                removed.line = removed.line.saturating_sub(delta);
                added.line = added.line.saturating_sub(delta);
            }
        }
    }

    /// Ranges to highlight for this hunk, by decoration kind.
    pub fn decorations(&self) -> Vec<(DecorationKind, LineRange)> {
        match self {
            Hunk::Removed(block) => vec![(DecorationKind::Deletion, block.range())],
            Hunk::Added(block) => vec![(DecorationKind::Insertion, block.range())],
            Hunk::Modified { removed, added } => vec![
                (DecorationKind::Deletion, removed.range()),
                (DecorationKind::Insertion, added.range()),
            ],
        }
    }

    /// Lines removed from and added to the original by this hunk.
    pub fn line_counts(&self) -> (usize, usize) {
        match self {
            Hunk::Removed(block) => (block.count, 0),
            Hunk::Added(block) => (0, block.count),
            Hunk::Modified { removed, added } => (removed.count, added.count),
        }
    }
}

/// Discriminant of [`Hunk`], for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HunkKind {
    Removed,
    Added,
    Modified,
}

/// Highlight style a host applies to a line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    Insertion,
    Deletion,
}

/// What a user can do to a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

/// An inline Accept/Reject action shown above a hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLens {
    pub line: usize,
    pub index: usize,
    pub decision: Decision,
}

impl CodeLens {
    pub fn title(&self) -> &'static str {
        match self.decision {
            Decision::Accept => "Accept",
            Decision::Reject => "Reject",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modified() -> Hunk {
        Hunk::Modified {
            removed: LineBlock::new(5, 2, "c\nd"),
            added: LineBlock::new(7, 3, "x\ny\nz"),
        }
    }

    #[test]
    fn modified_span_covers_both_blocks() {
        let hunk = modified();
        assert_eq!(hunk.first_line(), 5);
        assert_eq!(hunk.span(), LineRange::new(5, 5));
        assert!(hunk.span().contains(9));
        assert!(!hunk.span().contains(10));
    }

    #[test]
    fn shift_up_moves_both_blocks() {
        let mut hunk = modified();
        hunk.shift_up(3);
        assert_eq!(
            hunk,
            Hunk::Modified {
                removed: LineBlock::new(2, 2, "c\nd"),
                added: LineBlock::new(4, 3, "x\ny\nz"),
            }
        );
    }

    #[test]
    fn decorations_per_kind() {
        let added = Hunk::Added(LineBlock::new(1, 1, "a1"));
        assert_eq!(
            added.decorations(),
            vec![(DecorationKind::Insertion, LineRange::new(1, 1))]
        );
        assert_eq!(modified().decorations().len(), 2);
    }

    #[test]
    fn block_lines_keep_empty_lines() {
        let block = LineBlock::new(0, 2, "\n");
        assert_eq!(block.lines(), vec!["".to_string(), "".to_string()]);
        let run = DiffRun::added(1, "");
        assert_eq!(run.lines(), vec!["".to_string()]);
    }

    #[test]
    fn hunk_serializes_with_type_tag() {
        let json = serde_json::to_value(Hunk::Removed(LineBlock::new(3, 1, "x"))).unwrap();
        assert_eq!(json["type"], "removed");
        assert_eq!(json["line"], 3);
    }

    #[test]
    fn edit_line_delta() {
        let edit = TextEdit::replace(LineRange::new(2, 3), vec!["a".into()]);
        assert_eq!(edit.line_delta(), -2);
        assert_eq!(TextEdit::delete(LineRange::new(0, 1)).line_delta(), -1);
    }

    #[test]
    fn decision_parses_case_insensitively() {
        assert_eq!("ACCEPT".parse::<Decision>().unwrap(), Decision::Accept);
        assert_eq!(Decision::Reject.to_string(), "reject");
    }
}
