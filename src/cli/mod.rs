//! CLI command definitions and argument parsing.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

/// Read proposed content from a file, or from stdin when the path is `-`.
pub async fn read_proposed(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("failed to read proposed content from stdin")?;
        return Ok(content);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read proposed content from {}", path.display()))
}
