//! Output renderers: terminal and JSON.

pub mod json;
pub mod terminal;

use crate::anchor::GenerationRequest;
use crate::models::{ApplyReport, PreviewReport};

pub use json::JsonRenderer;
pub use terminal::TerminalRenderer;

/// Trait for rendering command results to an output format.
pub trait OutputRenderer {
    /// Render the hunks a proposal would produce.
    fn render_preview(&self, report: &PreviewReport) -> String;

    /// Render the decisions taken by `apply`.
    fn render_apply(&self, report: &ApplyReport) -> String;

    /// Render a generation anchor.
    fn render_anchor(&self, request: &GenerationRequest) -> String;
}
