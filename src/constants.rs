//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and review defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "hunkwise";

/// Crate version, as reported by `hunkwise version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// Local config filename (e.g. `.hunkwise.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".hunkwise.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "hunkwise";

/// Minimum trimmed line length that makes a line significant for anchoring.
///
/// Shorter lines (a lone `}` or `);`) match too often to be useful probes.
pub const MIN_ANCHOR_LINE_LEN: usize = 4;

/// Default `tracing` filter when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// URI scheme prefix for documents backed by an existing file.
pub const FILE_SCHEME: &str = "file://";

/// URI scheme prefix for documents that do not exist on disk yet.
pub const UNTITLED_SCHEME: &str = "untitled:";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_LOG: &str = "HUNKWISE_LOG";
pub const ENV_DIFF_ALGORITHM: &str = "HUNKWISE_DIFF_ALGORITHM";
pub const ENV_MIN_ANCHOR_LINE_LEN: &str = "HUNKWISE_MIN_ANCHOR_LINE_LEN";
pub const ENV_SAVE_ON_RESOLVE: &str = "HUNKWISE_SAVE_ON_RESOLVE";
