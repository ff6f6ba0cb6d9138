//! Shared types used across all modules.
//!
//! This module defines the core data structures for documents, diff runs,
//! hunks, line ranges, and command reports. Other modules import from here
//! rather than reaching into each other's internals.

pub mod document;
pub mod hunk;
pub mod report;

pub use document::{DocumentId, Eol};
pub use hunk::{
    CodeLens, Decision, DecorationKind, DiffRun, Hunk, HunkKind, LineBlock, LineRange, TextEdit,
};
pub use report::{ApplyReport, PreviewReport, ReviewSummary};
