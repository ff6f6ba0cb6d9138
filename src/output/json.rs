//! JSON output renderer.
//!
//! Previews render as `{"file", "eol", "hunks": [...], "summary": {...}}`.

use serde::Serialize;

use crate::anchor::GenerationRequest;
use crate::models::{ApplyReport, PreviewReport};
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

impl OutputRenderer for JsonRenderer {
    fn render_preview(&self, report: &PreviewReport) -> String {
        pretty(report)
    }

    fn render_apply(&self, report: &ApplyReport) -> String {
        pretty(report)
    }

    fn render_anchor(&self, request: &GenerationRequest) -> String {
        pretty(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorFinder, GenerationRequest};
    use crate::models::{DocumentId, Eol, Hunk, LineBlock};

    #[test]
    fn render_preview_json() {
        let report = PreviewReport::new(
            "src/lib.rs",
            Eol::Lf,
            vec![Hunk::Added(LineBlock::new(1, 1, "a1"))],
        );
        let output = JsonRenderer.render_preview(&report);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["file"], "src/lib.rs");
        assert_eq!(parsed["eol"], "lf");
        assert_eq!(parsed["hunks"][0]["type"], "added");
        assert_eq!(parsed["summary"]["lines_added"], 1);
    }

    #[test]
    fn render_anchor_json() {
        let request = GenerationRequest::capture(
            DocumentId::from_uri("file:///a.rs"),
            "fn main() {\n    run();\n}",
            2,
            &AnchorFinder::default(),
        );
        let parsed: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render_anchor(&request)).unwrap();
        assert_eq!(parsed["doc"], "file:///a.rs");
        assert_eq!(parsed["line"], 2);
        assert!(parsed["range"]["line_count"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn render_unchanged_apply_json() {
        let report = ApplyReport {
            file: "x".into(),
            unchanged: true,
            ..ApplyReport::default()
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render_apply(&report)).unwrap();
        assert_eq!(parsed["unchanged"], true);
        assert_eq!(parsed["accepted"].as_array().unwrap().len(), 0);
    }
}
