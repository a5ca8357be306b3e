// src/config/validate.rs

use std::path::{Path, PathBuf};

use crate::config::model::{RawConfigFile, WatchConfiguration};
use crate::errors::{Result, WatchsError};

impl TryFrom<RawConfigFile> for WatchConfiguration {
    type Error = WatchsError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        if raw.watch_dir.trim().is_empty() {
            return Err(WatchsError::Config(
                "`watch_dir` must be set to the directory to watch".to_string(),
            ));
        }

        WatchConfiguration::new(
            raw.watch_dir.trim(),
            raw.file_types,
            raw.exclude_paths,
            raw.command,
        )
    }
}

/// Resolve `dir` to a canonical absolute path and check it is a directory.
pub(crate) fn validate_root(dir: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(dir)?;

    if !absolute.exists() {
        return Err(WatchsError::RootNotFound(absolute));
    }
    if !absolute.is_dir() {
        return Err(WatchsError::NotADirectory(absolute));
    }

    // Canonical form so that event paths reported by the notifier (which may
    // resolve symlinks, e.g. /var -> /private/var on macOS) share the prefix.
    Ok(absolute.canonicalize()?)
}

pub(crate) fn validate_command(command: String) -> Result<String> {
    if command.trim().is_empty() {
        return Err(WatchsError::EmptyCommand);
    }
    Ok(command)
}
