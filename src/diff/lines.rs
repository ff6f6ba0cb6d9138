//! Line-diff primitive: turns two line sequences into ordered runs.
//!
//! Backed by `similar`. Every change between two unchanged spans is
//! reported as one removed run followed by one added run, so consumers see
//! the same shape no matter how the algorithm split its operations.

use std::time::Instant;

use similar::{capture_diff_slices_deadline, DiffTag};

use super::DiffOptions;
use crate::models::{DiffRun, Eol};

/// Diff `old` against `new` line by line.
pub fn diff_lines(old: &[String], new: &[String], eol: Eol, options: &DiffOptions) -> Vec<DiffRun> {
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let ops = capture_diff_slices_deadline(options.algorithm.into(), old, new, deadline);

    let mut builder = RunBuilder::new(eol);
    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => builder.unchanged(&old[old_range]),
            DiffTag::Delete => builder.removed(&old[old_range]),
            DiffTag::Insert => builder.added(&new[new_range]),
            DiffTag::Replace => {
                builder.removed(&old[old_range]);
                builder.added(&new[new_range]);
            }
        }
    }
    builder.finish()
}

/// Accumulates operations into runs, holding changes until the next
/// unchanged span so removals always precede additions.
struct RunBuilder {
    eol: Eol,
    runs: Vec<DiffRun>,
    unchanged: Vec<String>,
    removed: Vec<String>,
    added: Vec<String>,
}

impl RunBuilder {
    fn new(eol: Eol) -> Self {
        Self {
            eol,
            runs: Vec::new(),
            unchanged: Vec::new(),
            removed: Vec::new(),
            added: Vec::new(),
        }
    }

    fn unchanged(&mut self, lines: &[String]) {
        self.flush_changes();
        self.unchanged.extend_from_slice(lines);
    }

    fn removed(&mut self, lines: &[String]) {
        self.flush_unchanged();
        self.removed.extend_from_slice(lines);
    }

    fn added(&mut self, lines: &[String]) {
        self.flush_unchanged();
        self.added.extend_from_slice(lines);
    }

    fn flush_unchanged(&mut self) {
        if !self.unchanged.is_empty() {
            let lines = std::mem::take(&mut self.unchanged);
            let run = DiffRun::unchanged(lines.len(), lines.join(self.eol.as_str()));
            self.runs.push(run);
        }
    }

    fn flush_changes(&mut self) {
        if !self.removed.is_empty() {
            let lines = std::mem::take(&mut self.removed);
            let run = DiffRun::removed(lines.len(), lines.join(self.eol.as_str()));
            self.runs.push(run);
        }
        if !self.added.is_empty() {
            let lines = std::mem::take(&mut self.added);
            let run = DiffRun::added(lines.len(), lines.join(self.eol.as_str()));
            self.runs.push(run);
        }
    }

    fn finish(mut self) -> Vec<DiffRun> {
        self.flush_unchanged();
        self.flush_changes();
        self.runs
    }
}
