//! Integration tests for the preview, apply, and anchor CLI commands.
//!
//! These tests exercise the library functions that back each command,
//! against real files in a temporary directory.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use hunkwise::anchor::{AnchorFinder, AnchorResult};
use hunkwise::commands::{self, ApplyPlan};
use hunkwise::config::Config;
use hunkwise::diff::DiffOptions;
use hunkwise::env::Env;
use hunkwise::host::{FsHost, NoDecorations};
use hunkwise::models::{Decision, HunkKind};
use hunkwise::output::{JsonRenderer, OutputRenderer};
use hunkwise::review::{ReviewController, ReviewOptions};

fn controller(options: ReviewOptions) -> ReviewController {
    ReviewController::new(Arc::new(FsHost::new()), Arc::new(NoDecorations), options)
}

// ---------------------------------------------------------------------------
// preview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_lists_hunks_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "a\nb\nc\nd\ne").unwrap();

    let report = commands::preview_file(&path, "a\na1\nb\nc1\ne\nf", &DiffOptions::default())
        .await
        .unwrap();

    let kinds: Vec<_> = report.hunks.iter().map(|h| h.kind()).collect();
    assert_eq!(kinds, vec![HunkKind::Added, HunkKind::Modified, HunkKind::Added]);
    assert_eq!(report.summary.lines_added, 3);
    assert_eq!(report.summary.lines_removed, 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\nc\nd\ne");

    let json: serde_json::Value =
        serde_json::from_str(&JsonRenderer.render_preview(&report)).unwrap();
    assert_eq!(json["hunks"][1]["type"], "modified");
    assert_eq!(json["hunks"][1]["removed"]["line"], 3);
}

#[tokio::test]
async fn preview_of_identical_content_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("same.txt");
    std::fs::write(&path, "x\r\ny").unwrap();

    // Line endings alone are not a change.
    let report = commands::preview_file(&path, "x\ny", &DiffOptions::default())
        .await
        .unwrap();
    assert!(report.hunks.is_empty());
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

#[tokio::test]
async fn apply_mixes_decisions_by_initial_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "a\nb\nc\nd\ne").unwrap();

    let plan = ApplyPlan::new(&[1], &[], Decision::Reject).unwrap();
    let report = commands::apply_file(
        &controller(ReviewOptions::default()),
        &path,
        "a\na1\nb\nc1\ne\nf",
        &plan,
    )
    .await
    .unwrap();

    assert_eq!(report.accepted, vec![1]);
    assert_eq!(report.rejected, vec![0, 2]);
    assert!(report.completed);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\nc1\ne");
}

#[tokio::test]
async fn apply_accept_rest_writes_proposal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "one\r\ntwo\r\n").unwrap();

    let plan = ApplyPlan::new(&[], &[], Decision::Accept).unwrap();
    let report = commands::apply_file(
        &controller(ReviewOptions::default()),
        &path,
        "one\n2\n",
        &plan,
    )
    .await
    .unwrap();

    assert_eq!(report.accepted, vec![0]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\r\n2\r\n");
}

#[tokio::test]
async fn apply_creates_new_file_when_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src").join("new.rs");

    let plan = ApplyPlan::new(&[0], &[], Decision::Reject).unwrap();
    commands::apply_file(
        &controller(ReviewOptions::default()),
        &path,
        "fn main() {}",
        &plan,
    )
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn main() {}");
}

#[tokio::test]
async fn apply_rejecting_new_file_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.rs");

    let plan = ApplyPlan::new(&[], &[], Decision::Reject).unwrap();
    let report = commands::apply_file(
        &controller(ReviewOptions::default()),
        &path,
        "fn main() {}",
        &plan,
    )
    .await
    .unwrap();

    assert!(report.completed);
    assert!(!path.exists());
}

#[tokio::test]
async fn apply_reports_unknown_indices() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, "a\nb").unwrap();

    let plan = ApplyPlan::new(&[0, 9], &[], Decision::Reject).unwrap();
    let report = commands::apply_file(&controller(ReviewOptions::default()), &path, "a\nB", &plan)
        .await
        .unwrap();

    assert_eq!(report.accepted, vec![0]);
    assert_eq!(report.skipped, vec![9]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nB");
}

#[tokio::test]
async fn apply_unchanged_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, "same").unwrap();

    let plan = ApplyPlan::new(&[], &[], Decision::Accept).unwrap();
    let report = commands::apply_file(&controller(ReviewOptions::default()), &path, "same", &plan)
        .await
        .unwrap();
    assert!(report.unchanged);
    assert!(report.accepted.is_empty());
}

#[tokio::test]
async fn apply_without_save_leaves_disk_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, "a").unwrap();

    let options = ReviewOptions {
        save_on_resolve: false,
        ..ReviewOptions::default()
    };
    let plan = ApplyPlan::new(&[], &[], Decision::Accept).unwrap();
    commands::apply_file(&controller(options), &path, "b", &plan)
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");
}

// ---------------------------------------------------------------------------
// anchor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn anchor_walks_up_past_short_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    std::fs::write(
        &path,
        "fn one() {\n    work();\n}\nfn two() {\n    work();\n}\n",
    )
    .unwrap();

    let request = commands::anchor_file(&path, 5, &AnchorFinder::default())
        .await
        .unwrap();
    assert_eq!(request.range, AnchorResult::new(3, 3));
    assert_eq!(request.code, "fn two() {\n    work();\n}");
}

#[tokio::test]
async fn anchor_uses_configured_minimum() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    std::fs::write(&path, "x\ny\nz").unwrap();

    let config_path = dir.path().join("hunkwise.toml");
    std::fs::write(&config_path, "[review]\nmin_anchor_line_len = 1\n").unwrap();
    let config = Config::load(None, Some(config_path.as_path()), &Env::mock(Vec::<(&str, &str)>::new()))
        .unwrap();

    let request = commands::anchor_file(&path, 1, &config.anchor_finder())
        .await
        .unwrap();
    assert_eq!(request.range, AnchorResult::new(1, 1));
    assert_eq!(request.code, "y");
}

#[tokio::test]
async fn anchor_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::anchor_file(&dir.path().join("nope.rs"), 0, &AnchorFinder::default()).await;
    assert!(result.is_err());
}
