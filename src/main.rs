//! hunkwise: hunk-by-hunk review of proposed file edits.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use hunkwise::commands;
use hunkwise::config;
use hunkwise::constants;
use hunkwise::env;
use hunkwise::host;
use hunkwise::review;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::{AnchorArgs, ApplyArgs, Cli, Command, PreviewArgs};
use config::Config;
use env::Env;
use host::{FsHost, NoDecorations};
use review::ReviewController;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().ok();
    let config = Config::load(cwd.as_deref(), cli.config.as_deref(), &Env::real())
        .context("failed to load configuration")?;
    init_logging(&config.logging.level);

    match cli.command {
        Command::Preview(args) => run_preview(args, &config).await,
        Command::Apply(args) => run_apply(args, &config).await,
        Command::Anchor(args) => run_anchor(args, &config).await,
        Command::Version => run_version(),
    }
}

/// Install the stderr `tracing` subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| {
        eprintln!("Warning: ignoring invalid log level: {level}");
        EnvFilter::new(constants::DEFAULT_LOG_LEVEL)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Print the hunks a proposal would produce.
async fn run_preview(args: PreviewArgs, config: &Config) -> Result<()> {
    let proposed = cli::read_proposed(&args.proposed).await?;
    let options = config.review_options();
    let report = commands::preview_file(&args.file, &proposed, &options.diff)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    print!("{}", args.format.render_preview(&report));
    Ok(())
}

/// Review a proposal non-interactively against the filesystem.
async fn run_apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let plan = args.plan().map_err(|e| anyhow!(e))?;
    let proposed = cli::read_proposed(&args.proposed).await?;

    let controller = ReviewController::new(
        Arc::new(FsHost::new()),
        Arc::new(NoDecorations),
        config.review_options(),
    );
    let report = commands::apply_file(&controller, &args.file, &proposed, &plan)
        .await
        .with_context(|| format!("failed to review {}", args.file.display()))?;
    controller.shutdown();

    print!("{}", args.format.render_apply(&report));
    Ok(())
}

/// Print the generation anchor for a line.
async fn run_anchor(args: AnchorArgs, config: &Config) -> Result<()> {
    let request = commands::anchor_file(&args.file, args.line, &config.anchor_finder())
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    print!("{}", args.format.render_anchor(&request));
    Ok(())
}
