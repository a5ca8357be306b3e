#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use watchs::config::{OptionsSection, RawConfigFile, WatchConfiguration};

/// A throwaway project directory for tests.
///
/// The path is canonicalized up front so it compares equal to a validated
/// `WatchConfiguration::root_directory()` (macOS tempdirs live behind a
/// `/var -> /private/var` symlink).
pub struct TempProject {
    _dir: TempDir,
    root: PathBuf,
}

impl TempProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let root = dir
            .path()
            .canonicalize()
            .expect("failed to canonicalize tempdir");
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories as needed.
    pub fn write_file(&self, rel: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, contents).expect("failed to write file");
        path
    }

    pub fn mkdir(&self, rel: impl AsRef<Path>) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("failed to create dir");
        path
    }

    /// Count lines in `rel`, treating a missing file as empty.
    ///
    /// Tests use `echo x >> marker` commands and count runs this way.
    pub fn line_count(&self, rel: impl AsRef<Path>) -> usize {
        fs::read_to_string(self.path(rel))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawConfigFile` / `WatchConfiguration` to simplify test setup.
pub struct ConfigBuilder {
    raw: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new(root: impl AsRef<Path>, command: &str) -> Self {
        Self {
            raw: RawConfigFile {
                watch_dir: root.as_ref().to_string_lossy().into_owned(),
                file_types: vec![],
                exclude_paths: vec![],
                command: command.to_string(),
                options: OptionsSection::default(),
            },
        }
    }

    pub fn file_type(mut self, ext: &str) -> Self {
        self.raw.file_types.push(ext.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.raw.exclude_paths.push(pattern.to_string());
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.raw.options.debounce_ms = Some(ms);
        self
    }

    pub fn settle_ms(mut self, ms: u64) -> Self {
        self.raw.options.settle_ms = Some(ms);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.raw
    }

    pub fn build(self) -> WatchConfiguration {
        WatchConfiguration::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}
