//! Clap argument types and validation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use hunkwise::anchor::GenerationRequest;
use hunkwise::commands::ApplyPlan;
use hunkwise::models::{ApplyReport, Decision, PreviewReport};
use hunkwise::output::{JsonRenderer, OutputRenderer, TerminalRenderer};

/// Hunk-by-hunk review of proposed file edits.
#[derive(Parser, Debug)]
#[command(name = "hunkwise", version = hunkwise::constants::VERSION)]
pub struct Cli {
    /// Read configuration from this file instead of the usual search.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Show the hunks a proposal would put under review, without writing.
    Preview(PreviewArgs),

    /// Review a proposal non-interactively and save the result.
    Apply(ApplyArgs),

    /// Print the generation anchor for a 0-based line.
    Anchor(AnchorArgs),

    /// Print version and build information.
    Version,
}

/// Arguments for the `preview` subcommand.
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// File the proposal would replace (may not exist yet).
    pub file: PathBuf,

    /// File holding the proposed content, or `-` for stdin.
    pub proposed: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

/// Arguments for the `apply` subcommand.
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// File the proposal replaces (created if missing and accepted).
    pub file: PathBuf,

    /// File holding the proposed content, or `-` for stdin.
    pub proposed: PathBuf,

    /// Accept these hunks (initial numbering, as shown by `preview`).
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub accept: Vec<usize>,

    /// Reject these hunks (initial numbering, as shown by `preview`).
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub reject: Vec<usize>,

    /// What to do with hunks not listed in --accept or --reject.
    #[arg(long, value_enum, default_value_t = RestDecision::Reject)]
    pub rest: RestDecision,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

impl ApplyArgs {
    /// Validate the hunk lists and turn them into a plan.
    pub fn plan(&self) -> Result<ApplyPlan, String> {
        ApplyPlan::new(&self.accept, &self.reject, self.rest.into())
    }
}

/// Arguments for the `anchor` subcommand.
#[derive(Parser, Debug)]
pub struct AnchorArgs {
    /// File to search.
    pub file: PathBuf,

    /// 0-based line the code would be generated at.
    pub line: usize,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

/// Decision for unlisted hunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RestDecision {
    Accept,
    Reject,
}

impl From<RestDecision> for Decision {
    fn from(rest: RestDecision) -> Self {
        match rest {
            RestDecision::Accept => Decision::Accept,
            RestDecision::Reject => Decision::Reject,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    fn renderer(&self) -> &'static dyn OutputRenderer {
        match self {
            OutputFormat::Terminal => &TerminalRenderer,
            OutputFormat::Json => &JsonRenderer,
        }
    }

    pub fn render_preview(&self, report: &PreviewReport) -> String {
        self.renderer().render_preview(report)
    }

    pub fn render_apply(&self, report: &ApplyReport) -> String {
        self.renderer().render_apply(report)
    }

    pub fn render_anchor(&self, request: &GenerationRequest) -> String {
        self.renderer().render_anchor(request)
    }
}
