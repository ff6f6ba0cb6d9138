//! Mutable line buffer with a memoized joined view.
//!
//! Documents are handled as whole lines everywhere in the review engine;
//! `LineEditor` is the one place that knows how text splits into lines
//! and how lines join back into text.

use std::cell::RefCell;

use thiserror::Error;

use crate::models::{Eol, TextEdit};

/// Errors from line-level edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineEditError {
    #[error("cannot edit {count} line(s) at line {start}: buffer has {len} lines")]
    OutOfRange {
        start: usize,
        count: usize,
        len: usize,
    },
}

/// Split text on `\r\n`, `\n` or a lone `\r`.
///
/// An empty string is one empty line, and a trailing separator yields a
/// trailing empty line, so splitting and joining with the detected EOL
/// reproduces the text exactly for uniformly terminated documents.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    lines.push(current);
    lines
}

/// An ordered sequence of lines that can be edited in place.
#[derive(Debug)]
pub struct LineEditor {
    lines: Vec<String>,
    eol: Eol,
    /// Joined text, valid until the next mutation.
    joined: RefCell<Option<String>>,
}

impl LineEditor {
    pub fn new(text: &str, eol: Eol) -> Self {
        Self {
            lines: split_lines(text),
            eol,
            joined: RefCell::new(None),
        }
    }

    /// Build an editor using the EOL detected in `text`.
    pub fn detect(text: &str) -> Self {
        Self::new(text, Eol::detect(text))
    }

    pub fn eol(&self) -> Eol {
        self.eol
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// The buffer joined with its EOL.
    pub fn current(&self) -> String {
        self.joined
            .borrow_mut()
            .get_or_insert_with(|| self.lines.join(self.eol.as_str()))
            .clone()
    }

    /// Remove `count` lines starting at `start`.
    pub fn delete(&mut self, start: usize, count: usize) -> Result<(), LineEditError> {
        self.check_range(start, count)?;
        self.lines.drain(start..start + count);
        self.invalidate();
        Ok(())
    }

    /// Insert lines before `start`, shifting the following lines down.
    ///
    /// `start` may equal the buffer length to append.
    pub fn insert<I, S>(&mut self, start: usize, lines: I) -> Result<(), LineEditError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if start > self.lines.len() {
            return Err(LineEditError::OutOfRange {
                start,
                count: 0,
                len: self.lines.len(),
            });
        }
        let tail = self.lines.split_off(start);
        self.lines.extend(lines.into_iter().map(Into::into));
        self.lines.extend(tail);
        self.invalidate();
        Ok(())
    }

    /// Insert a block of text, split into lines.
    pub fn insert_text(&mut self, start: usize, text: &str) -> Result<(), LineEditError> {
        self.insert(start, split_lines(text))
    }

    /// Apply a range replacement.
    pub fn apply(&mut self, edit: &TextEdit) -> Result<(), LineEditError> {
        self.delete(edit.range.start, edit.range.count)?;
        if !edit.lines.is_empty() {
            self.insert(edit.range.start, edit.lines.iter().cloned())?;
        }
        Ok(())
    }

    /// Replace the whole buffer.
    pub fn replace_all<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self.invalidate();
    }

    fn check_range(&self, start: usize, count: usize) -> Result<(), LineEditError> {
        match start.checked_add(count) {
            Some(end) if end <= self.lines.len() => Ok(()),
            _ => Err(LineEditError::OutOfRange {
                start,
                count,
                len: self.lines.len(),
            }),
        }
    }

    fn invalidate(&mut self) {
        self.joined.get_mut().take();
    }
}

impl Clone for LineEditor {
    fn clone(&self) -> Self {
        Self {
            lines: self.lines.clone(),
            eol: self.eol,
            joined: RefCell::new(self.joined.borrow().clone()),
        }
    }
}
