//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.hunkwise.toml` in the working directory
//! 4. `~/.config/hunkwise/config.toml` (global defaults)
//! 5. Built-in defaults
//!
//! An explicit `--config <PATH>` replaces layers 3 and 4.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::anchor::AnchorFinder;
use crate::constants::{
    CONFIG_DIR, CONFIG_FILENAME, DEFAULT_LOG_LEVEL, ENV_DIFF_ALGORITHM, ENV_LOG,
    ENV_MIN_ANCHOR_LINE_LEN, ENV_SAVE_ON_RESOLVE, MIN_ANCHOR_LINE_LEN,
};
use crate::diff::{DiffAlgorithm, DiffOptions};
use crate::env::{Env, InvalidValue};
use crate::review::ReviewOptions;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub review: ReviewConfig,
    pub logging: LoggingConfig,
}

/// Review engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Shortest trimmed line the anchor finder treats as significant.
    pub min_anchor_line_len: usize,
    pub diff_algorithm: DiffAlgorithm,
    /// Deadline for the line diff in milliseconds; 0 means none.
    pub diff_timeout_ms: u64,
    pub save_on_resolve: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_anchor_line_len: MIN_ANCHOR_LINE_LEN,
            diff_algorithm: DiffAlgorithm::default(),
            diff_timeout_ms: 0,
            save_on_resolve: true,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A `tracing` filter directive such as `warn` or `hunkwise=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// With `explicit` set only that file is read; otherwise the global
    /// config and then `.hunkwise.toml` in `cwd` are layered. Environment
    /// variable overrides apply last either way.
    pub fn load(cwd: Option<&Path>, explicit: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = explicit {
            config.merge(Self::load_file(path)?);
        } else {
            // Layer 4: global config
            if let Some(global_path) = Self::global_config_path() {
                if global_path.exists() {
                    config.merge(Self::load_file(&global_path)?);
                }
            }

            // Layer 3: working-directory config
            if let Some(root) = cwd {
                let local_path = root.join(CONFIG_FILENAME);
                if local_path.exists() {
                    config.merge(Self::load_file(&local_path)?);
                }
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other wins for non-default values).
    fn merge(&mut self, other: Config) {
        let default_review = ReviewConfig::default();
        if other.review.min_anchor_line_len != default_review.min_anchor_line_len {
            self.review.min_anchor_line_len = other.review.min_anchor_line_len;
        }
        if other.review.diff_algorithm != default_review.diff_algorithm {
            self.review.diff_algorithm = other.review.diff_algorithm;
        }
        if other.review.diff_timeout_ms != default_review.diff_timeout_ms {
            self.review.diff_timeout_ms = other.review.diff_timeout_ms;
        }
        // Disabled overrides enabled
        if !other.review.save_on_resolve {
            self.review.save_on_resolve = false;
        }

        if other.logging.level != LoggingConfig::default().level {
            self.logging.level = other.logging.level;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(level) = env.var(ENV_LOG) {
            self.logging.level = level;
        }

        if let Some(value) = env.var(ENV_DIFF_ALGORITHM) {
            match value.parse::<DiffAlgorithm>() {
                Ok(algorithm) => self.review.diff_algorithm = algorithm,
                Err(_) => eprintln!("Warning: ignoring invalid {ENV_DIFF_ALGORITHM} value: {value}"),
            }
        }

        match env.number(ENV_MIN_ANCHOR_LINE_LEN) {
            Some(Ok(len)) => self.review.min_anchor_line_len = len,
            Some(Err(invalid)) => warn_invalid(&invalid),
            None => {}
        }

        match env.flag(ENV_SAVE_ON_RESOLVE) {
            Some(Ok(save)) => self.review.save_on_resolve = save,
            Some(Err(invalid)) => warn_invalid(&invalid),
            None => {}
        }
    }

    /// Options for the review controller.
    pub fn review_options(&self) -> ReviewOptions {
        let timeout = (self.review.diff_timeout_ms > 0)
            .then(|| Duration::from_millis(self.review.diff_timeout_ms));
        ReviewOptions {
            diff: DiffOptions {
                algorithm: self.review.diff_algorithm,
                timeout,
            },
            save_on_resolve: self.review.save_on_resolve,
        }
    }

    pub fn anchor_finder(&self) -> AnchorFinder {
        AnchorFinder::new(self.review.min_anchor_line_len)
    }
}

fn warn_invalid(invalid: &InvalidValue) {
    eprintln!(
        "Warning: ignoring invalid {} value: {}",
        invalid.name, invalid.value
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_env() -> Env {
        Env::mock(Vec::<(&str, &str)>::new())
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.review.min_anchor_line_len, 4);
        assert_eq!(config.review.diff_algorithm, DiffAlgorithm::Myers);
        assert!(config.review.save_on_resolve);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.review_options(), ReviewOptions::default());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[review]
min_anchor_line_len = 6
diff_algorithm = "patience"
diff_timeout_ms = 250
save_on_resolve = false

[logging]
level = "hunkwise=debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.review.min_anchor_line_len, 6);
        assert_eq!(config.review.diff_algorithm, DiffAlgorithm::Patience);
        assert!(!config.review.save_on_resolve);
        assert_eq!(config.logging.level, "hunkwise=debug");

        let options = config.review_options();
        assert_eq!(options.diff.timeout, Some(Duration::from_millis(250)));
        assert!(!options.save_on_resolve);
        assert_eq!(config.anchor_finder().min_line_len(), 6);
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = Config::default();
        base.review.diff_algorithm = DiffAlgorithm::Lcs;
        base.logging.level = "info".into();

        base.merge(Config::default());

        assert_eq!(base.review.diff_algorithm, DiffAlgorithm::Lcs);
        assert_eq!(base.logging.level, "info");
    }

    #[test]
    fn merge_disabling_save_wins() {
        let mut base = Config::default();
        let mut other = Config::default();
        other.review.save_on_resolve = false;
        other.review.min_anchor_line_len = 2;
        base.merge(other);
        assert!(!base.review.save_on_resolve);
        assert_eq!(base.review.min_anchor_line_len, 2);
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let result = Config::load_file(&path);
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[test]
    fn load_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_file(&dir.path().join("missing.toml"));
        assert!(result.unwrap_err().to_string().contains("read"));
    }

    #[test]
    fn load_from_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".hunkwise.toml"),
            "[review]\ndiff_algorithm = \"lcs\"\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), None, &no_env()).unwrap();
        assert_eq!(config.review.diff_algorithm, DiffAlgorithm::Lcs);
    }

    #[test]
    fn explicit_file_replaces_search() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".hunkwise.toml"),
            "[review]\ndiff_algorithm = \"lcs\"\n",
        )
        .unwrap();
        let explicit = dir.path().join("custom.toml");
        std::fs::write(&explicit, "[review]\nmin_anchor_line_len = 1\n").unwrap();

        let config = Config::load(Some(dir.path()), Some(explicit.as_path()), &no_env()).unwrap();
        assert_eq!(config.review.diff_algorithm, DiffAlgorithm::Myers);
        assert_eq!(config.review.min_anchor_line_len, 1);
    }

    #[test]
    fn env_vars_override_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".hunkwise.toml"),
            "[review]\ndiff_algorithm = \"lcs\"\n[logging]\nlevel = \"info\"\n",
        )
        .unwrap();
        let env = Env::mock([
            ("HUNKWISE_DIFF_ALGORITHM", "patience"),
            ("HUNKWISE_LOG", "debug"),
            ("HUNKWISE_MIN_ANCHOR_LINE_LEN", "8"),
            ("HUNKWISE_SAVE_ON_RESOLVE", "off"),
        ]);

        let config = Config::load(Some(dir.path()), None, &env).unwrap();
        assert_eq!(config.review.diff_algorithm, DiffAlgorithm::Patience);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.review.min_anchor_line_len, 8);
        assert!(!config.review.save_on_resolve);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let env = Env::mock([
            ("HUNKWISE_DIFF_ALGORITHM", "histogram"),
            ("HUNKWISE_MIN_ANCHOR_LINE_LEN", "four"),
            ("HUNKWISE_SAVE_ON_RESOLVE", "sometimes"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn global_config_path_mentions_app() {
        if let Some(p) = Config::global_config_path() {
            assert!(p.to_string_lossy().contains("hunkwise"));
        }
    }
}
