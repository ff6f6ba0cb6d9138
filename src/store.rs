//! Pending change registry: one `FileChangeSet` per document under review.
//!
//! Hunk line numbers always address the live preview buffer. Resolving a
//! hunk removes it and moves every later hunk up by the number of lines the
//! resolution took out of the buffer, so the remaining positions stay valid
//! without recomputing the diff.

use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{CodeLens, Decision, DecorationKind, DocumentId, Hunk, LineRange};

/// Review state for a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangeSet {
    pub original_content: String,
    pub modified_content: String,
    /// Pending hunks in ascending line order.
    pub hunks: Vec<Hunk>,
}

impl FileChangeSet {
    pub fn new(original_content: String, modified_content: String, hunks: Vec<Hunk>) -> Self {
        Self {
            original_content,
            modified_content,
            hunks,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Index of the hunk whose preview span contains `line`.
    pub fn hunk_at_line(&self, line: usize) -> Option<usize> {
        self.hunks.iter().position(|h| h.span().contains(line))
    }

    /// An Accept and a Reject lens per hunk, at the hunk's first line.
    pub fn code_lenses(&self) -> Vec<CodeLens> {
        self.hunks
            .iter()
            .enumerate()
            .flat_map(|(index, hunk)| {
                let line = hunk.first_line();
                [Decision::Accept, Decision::Reject].map(|decision| CodeLens {
                    line,
                    index,
                    decision,
                })
            })
            .collect()
    }

    /// All ranges of one decoration kind, in line order.
    pub fn decoration_ranges(&self, kind: DecorationKind) -> Vec<LineRange> {
        self.hunks
            .iter()
            .flat_map(Hunk::decorations)
            .filter(|(k, _)| *k == kind)
            .map(|(_, range)| range)
            .collect()
    }
}

/// Result of [`PendingChangeStore::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// No entry for the document.
    Missing,
    /// The index does not name a pending hunk; nothing changed.
    StaleIndex { index: usize, len: usize },
    /// Hunk removed; this many remain.
    Remaining(usize),
    /// The last hunk was resolved and the entry was dropped.
    Emptied,
}

/// Map from document identity to its pending changes, in registration order.
#[derive(Debug, Default)]
pub struct PendingChangeStore {
    entries: IndexMap<DocumentId, FileChangeSet>,
}

impl PendingChangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the entry for `id`.
    pub fn register(
        &mut self,
        id: DocumentId,
        original_content: String,
        modified_content: String,
        hunks: Vec<Hunk>,
    ) {
        self.entries.insert(
            id,
            FileChangeSet::new(original_content, modified_content, hunks),
        );
    }

    pub fn get(&self, id: &DocumentId) -> Option<&FileChangeSet> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.entries.contains_key(id)
    }

    /// Remove hunk `index` and move later hunks up by `line_delta`.
    pub fn resolve(&mut self, id: &DocumentId, index: usize, line_delta: usize) -> ResolveOutcome {
        let Some(entry) = self.entries.get_mut(id) else {
            return ResolveOutcome::Missing;
        };
        if index >= entry.hunks.len() {
            return ResolveOutcome::StaleIndex {
                index,
                len: entry.hunks.len(),
            };
        }

        entry.hunks.remove(index);
        for hunk in &mut entry.hunks[index..] {
            hunk.shift_up(line_delta);
        }

        let remaining = entry.hunks.len();
        if remaining == 0 {
            self.entries.shift_remove(id);
            ResolveOutcome::Emptied
        } else {
            ResolveOutcome::Remaining(remaining)
        }
    }

    /// Discard the entry unconditionally.
    pub fn remove(&mut self, id: &DocumentId) -> Option<FileChangeSet> {
        self.entries.shift_remove(id)
    }

    /// Documents under review, in registration order.
    pub fn ids(&self) -> Vec<DocumentId> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
