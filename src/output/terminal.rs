//! Terminal renderer: styled flowing text, one block per hunk.

use colored::Colorize;

use crate::anchor::GenerationRequest;
use crate::models::{ApplyReport, Hunk, LineBlock, PreviewReport};
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn push_block(output: &mut String, block: &LineBlock, removed: bool) {
    for line in block.lines() {
        let styled = if removed {
            format!("- {line}").red().to_string()
        } else {
            format!("+ {line}").green().to_string()
        };
        output.push_str(&format!("   {styled}\n"));
    }
}

fn indices(list: &[usize]) -> String {
    list.iter()
        .map(|i| format!("#{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl OutputRenderer for TerminalRenderer {
    fn render_preview(&self, report: &PreviewReport) -> String {
        if report.hunks.is_empty() {
            return format!("{}", "  ✔ No changes proposed.\n".green());
        }

        let mut output = format!(" {}\n\n", report.file.bold());
        for (index, hunk) in report.hunks.iter().enumerate() {
            output.push_str(&format!(
                " {} {} at line {}\n",
                format!("#{index}").cyan().bold(),
                hunk.kind(),
                hunk.first_line()
            ));
            match hunk {
                Hunk::Removed(block) => push_block(&mut output, block, true),
                Hunk::Added(block) => push_block(&mut output, block, false),
                Hunk::Modified { removed, added } => {
                    push_block(&mut output, removed, true);
                    push_block(&mut output, added, false);
                }
            }
            output.push('\n');
        }

        let summary = &report.summary;
        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " {}: {} added, {} removed, {} modified ({} {})\n",
            plural(summary.hunks, "hunk").bold(),
            summary.added,
            summary.removed,
            summary.modified,
            format!("+{}", summary.lines_added).green(),
            format!("-{}", summary.lines_removed).red(),
        ));
        output
    }

    fn render_apply(&self, report: &ApplyReport) -> String {
        if report.unchanged {
            return format!(
                "  {} {} already matches the proposal.\n",
                "✔".green(),
                report.file.bold()
            );
        }

        let mut output = format!(" {}\n", report.file.bold());
        if !report.accepted.is_empty() {
            output.push_str(&format!(
                "   {} accepted {}\n",
                "✔".green(),
                indices(&report.accepted)
            ));
        }
        if !report.rejected.is_empty() {
            output.push_str(&format!(
                "   {} rejected {}\n",
                "✖".red(),
                indices(&report.rejected)
            ));
        }
        if !report.skipped.is_empty() {
            output.push_str(&format!(
                "   {} no such hunk {}\n",
                "⚠".yellow(),
                indices(&report.skipped)
            ));
        }
        if !report.completed {
            output.push_str(&format!("   {}\n", "review left incomplete".yellow()));
        }
        output
    }

    fn render_anchor(&self, request: &GenerationRequest) -> String {
        let range = request.range;
        let mut output = format!(
            " {} line {} anchored by {} starting at line {}\n",
            request.doc.to_string().bold(),
            request.line,
            plural(range.line_count, "line"),
            range.start_line
        );
        for line in request.code.lines() {
            output.push_str(&format!("   {} {}\n", "│".dimmed(), line));
        }
        output
    }
}
