// src/watch/policy.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::WatchConfiguration;

/// Include/exclude decision for candidate paths.
///
/// Every exclude pattern is tried two ways:
/// - as a path (relative patterns resolve against the watch root): a path
///   equal to it, or below it, is excluded;
/// - as a glob matched against the candidate's base name (`*.swp`,
///   `node_modules`).
///
/// Exclusion always wins over the extension filter.
#[derive(Clone)]
pub struct MatchPolicy {
    excluded_paths: Vec<PathBuf>,
    excluded_names: GlobSet,
    include_extensions: BTreeSet<String>,
}

impl fmt::Debug for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchPolicy")
            .field("excluded_paths", &self.excluded_paths)
            .field("include_extensions", &self.include_extensions)
            .finish_non_exhaustive()
    }
}

impl MatchPolicy {
    pub fn from_config(config: &WatchConfiguration) -> Self {
        Self::new(
            config.root_directory(),
            config.include_extensions().iter().cloned(),
            config.exclude_patterns(),
        )
    }

    pub fn new<I, S>(root: &Path, include_extensions: I, exclude_patterns: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excluded_paths = exclude_patterns
            .iter()
            .map(|pat| resolve_pattern_path(root, pat))
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pat in exclude_patterns {
            match GlobBuilder::new(pat).literal_separator(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => {
                    debug!(pattern = %pat, error = %err, "exclude pattern is not a valid glob; using it as a path only");
                }
            }
        }
        let excluded_names = builder.build().unwrap_or_else(|err| {
            debug!(error = %err, "failed to compile exclude globs; base-name matching disabled");
            GlobSet::empty()
        });

        Self {
            excluded_paths,
            excluded_names,
            include_extensions: include_extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// True if `path` should be watched and acted on.
    pub fn should_watch(&self, path: &Path) -> bool {
        if self.is_excluded(path) {
            return false;
        }

        if self.include_extensions.is_empty() {
            return true;
        }

        match extension_with_dot(path) {
            Some(ext) => self.include_extensions.contains(&ext),
            None => false,
        }
    }

    /// True if `path` is hit by an exclude pattern, ignoring extension rules.
    ///
    /// Directories are tested with this alone so an excluded directory
    /// removes its whole subtree from the walk.
    pub fn is_excluded(&self, path: &Path) -> bool {
        // `Path::starts_with` compares whole components, so `/a/bc` is not
        // treated as being under `/a/b`.
        if self.excluded_paths.iter().any(|ex| path.starts_with(ex)) {
            return true;
        }

        match path.file_name() {
            Some(name) => self.excluded_names.is_match(Path::new(name)),
            None => false,
        }
    }
}

fn resolve_pattern_path(root: &Path, pattern: &str) -> PathBuf {
    let p = Path::new(pattern);
    if p.is_absolute() {
        // Match the canonical root when the excluded path exists.
        p.canonicalize().unwrap_or_else(|_| p.to_path_buf())
    } else {
        root.join(p)
    }
}

/// `.ext` for the last dot-separated part of the file name, if any.
fn extension_with_dot(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}
