// src/config/model.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::validate::{validate_command, validate_root};
use crate::errors::Result;

/// Default minimum gap between two accepted command runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default pause between a file event and acting on it.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Configuration file as read from TOML.
///
/// ```toml
/// watch_dir = "."
/// file_types = [".rs", ".toml"]
/// exclude_paths = ["target", ".git", "*.swp"]
/// command = "cargo test"
///
/// [options]
/// debounce_ms = 500
/// settle_ms = 100
/// ```
///
/// Only `watch_dir` and `command` are required; validation into a
/// [`WatchConfiguration`] happens in `validate.rs`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RawConfigFile {
    /// Directory to watch. Relative paths resolve against the current
    /// working directory.
    #[serde(default)]
    pub watch_dir: String,

    /// Extensions to react to, with the leading dot (e.g. `".go"`).
    /// Empty means every file.
    #[serde(default)]
    pub file_types: Vec<String>,

    /// Path prefixes or base-name globs to ignore.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Shell command run on change.
    #[serde(default)]
    pub command: String,

    /// Engine timing knobs from `[options]`.
    #[serde(default, skip_serializing_if = "OptionsSection::is_empty")]
    pub options: OptionsSection,
}

/// `[options]` section.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OptionsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,
}

impl OptionsSection {
    pub fn is_empty(&self) -> bool {
        self.debounce_ms.is_none() && self.settle_ms.is_none()
    }
}

/// Timing behaviour of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Minimum elapsed time between two accepted command runs.
    pub debounce: Duration,
    /// Pause between a qualifying file event and running the command.
    pub settle_delay: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl EngineOptions {
    /// Build options from optional millisecond values.
    ///
    /// A missing or zero debounce falls back to [`DEFAULT_DEBOUNCE`]. A
    /// missing settle delay falls back to [`DEFAULT_SETTLE_DELAY`]; an
    /// explicit zero disables it.
    pub fn from_millis(debounce_ms: Option<u64>, settle_ms: Option<u64>) -> Self {
        let debounce = match debounce_ms {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => DEFAULT_DEBOUNCE,
        };
        let settle_delay = settle_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SETTLE_DELAY);

        Self {
            debounce,
            settle_delay,
        }
    }
}

/// Validated, immutable watch configuration.
///
/// Invariants (checked on every construction path):
/// - `root_directory` is absolute, exists and is a directory;
/// - `command` is not blank.
///
/// Overrides never mutate an instance; see [`WatchConfiguration::with_overrides`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfiguration {
    root_directory: PathBuf,
    include_extensions: BTreeSet<String>,
    exclude_patterns: Vec<String>,
    command: String,
}

impl WatchConfiguration {
    pub fn new<I, E, S, T>(
        root_directory: impl AsRef<Path>,
        include_extensions: I,
        exclude_patterns: E,
        command: impl Into<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        E: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let root_directory = validate_root(root_directory.as_ref())?;
        let command = validate_command(command.into())?;

        Ok(Self {
            root_directory,
            include_extensions: include_extensions.into_iter().map(Into::into).collect(),
            exclude_patterns: exclude_patterns.into_iter().map(Into::into).collect(),
            command,
        })
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Extensions (with leading dot) that qualify a path. Empty matches all.
    pub fn include_extensions(&self) -> &BTreeSet<String> {
        &self.include_extensions
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Produce a new configuration with every present override applied.
    ///
    /// The result is re-validated, so e.g. overriding the directory with a
    /// missing path fails exactly like [`WatchConfiguration::new`] would.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Result<Self> {
        let root = overrides
            .watch_dir
            .clone()
            .unwrap_or_else(|| self.root_directory.clone());
        let includes = overrides
            .file_types
            .clone()
            .unwrap_or_else(|| self.include_extensions.iter().cloned().collect());
        let excludes = overrides
            .exclude_paths
            .clone()
            .unwrap_or_else(|| self.exclude_patterns.clone());
        let command = overrides
            .command
            .clone()
            .unwrap_or_else(|| self.command.clone());

        Self::new(root, includes, excludes, command)
    }
}

/// Values supplied on the command line that replace file values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub watch_dir: Option<PathBuf>,
    pub file_types: Option<Vec<String>>,
    pub exclude_paths: Option<Vec<String>>,
    pub command: Option<String>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.watch_dir.is_none()
            && self.file_types.is_none()
            && self.exclude_paths.is_none()
            && self.command.is_none()
    }
}
