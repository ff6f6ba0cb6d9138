//! Unique anchor search for "generate code here" requests.
//!
//! An agent asked to generate code at a cursor needs a snippet it can find
//! again in the file. The finder returns the smallest block of lines ending
//! at the cursor line whose text occurs exactly once in the document.

use serde::Serialize;

use crate::constants::MIN_ANCHOR_LINE_LEN;
use crate::editor::split_lines;
use crate::models::{DocumentId, Eol};

/// The anchored block: `line_count` lines starting at `start_line`.
///
/// When nothing unique is found the result is `(0, target_line)`, the
/// lines above the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnchorResult {
    pub start_line: usize,
    pub line_count: usize,
}

impl AnchorResult {
    pub fn new(start_line: usize, line_count: usize) -> Self {
        Self {
            start_line,
            line_count,
        }
    }
}

/// Greedy upward search for a unique block of lines.
#[derive(Debug, Clone, Copy)]
pub struct AnchorFinder {
    min_line_len: usize,
}

impl Default for AnchorFinder {
    fn default() -> Self {
        Self::new(MIN_ANCHOR_LINE_LEN)
    }
}

impl AnchorFinder {
    /// `min_line_len` is the shortest trimmed line that may start a probe.
    pub fn new(min_line_len: usize) -> Self {
        Self { min_line_len }
    }

    pub fn min_line_len(&self) -> usize {
        self.min_line_len
    }

    /// Find the minimal unique block that ends at `line`.
    pub fn find_anchor(&self, document: &str, line: usize) -> AnchorResult {
        let eol = Eol::detect(document);
        let lines = split_lines(document);
        let Some(target) = lines.get(line) else {
            return AnchorResult::new(0, line);
        };

        let trimmed = target.trim();
        if self.is_significant(trimmed) && occurs_once(document, trimmed) {
            return AnchorResult::new(line, 1);
        }

        for candidate in (0..line).rev() {
            if !self.is_significant(lines[candidate].trim()) {
                continue;
            }
            let block = lines[candidate..=line].join(eol.as_str());
            if occurs_once(document, &block) {
                return AnchorResult::new(candidate, line - candidate + 1);
            }
        }

        AnchorResult::new(0, line)
    }

    fn is_significant(&self, trimmed: &str) -> bool {
        trimmed.chars().count() >= self.min_line_len
    }
}

/// `true` when `needle` is found and a second search, starting one
/// character past the first hit, finds nothing.
fn occurs_once(haystack: &str, needle: &str) -> bool {
    let Some(first) = haystack.find(needle) else {
        return false;
    };
    let next = haystack[first..]
        .chars()
        .next()
        .map_or(haystack.len(), |c| first + c.len_utf8());
    !haystack[next..].contains(needle)
}

/// A "generate code here" request, ready to relay to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub doc: DocumentId,
    /// Cursor line the code should be generated at.
    pub line: usize,
    /// Text of the anchored lines.
    pub code: String,
    pub range: AnchorResult,
}

impl GenerationRequest {
    /// Anchor `line` in `text` and capture the anchored snippet.
    pub fn capture(doc: DocumentId, text: &str, line: usize, finder: &AnchorFinder) -> Self {
        let range = finder.find_anchor(text, line);
        let lines = split_lines(text);
        let end = (range.start_line + range.line_count).min(lines.len());
        let start = range.start_line.min(end);
        let code = lines[start..end].join(Eol::detect(text).as_str());
        Self {
            doc,
            line,
            code,
            range,
        }
    }
}
