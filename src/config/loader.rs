// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::config::model::{ConfigOverrides, OptionsSection, RawConfigFile, WatchConfiguration};
use crate::errors::{Result, WatchsError};

/// Default config file name, looked up in the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Watchs.toml";

/// A validated configuration together with the file's `[options]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: WatchConfiguration,
    pub options: OptionsSection,
}

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a [`WatchConfiguration`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LoadedConfig> {
    let raw = load_from_path(&path)?;
    let options = raw.options;
    let config = WatchConfiguration::try_from(raw)?;
    Ok(LoadedConfig { config, options })
}

/// Load the config file at `path` and apply command-line overrides.
///
/// - File present: every override that is set replaces the file value.
/// - File missing, but both `watch_dir` and `command` overrides given: the
///   configuration is built from the overrides alone.
/// - Anything else is an error.
pub fn load_or_create(path: impl AsRef<Path>, overrides: &ConfigOverrides) -> Result<LoadedConfig> {
    let path = path.as_ref();

    match load_and_validate(path) {
        Ok(loaded) if overrides.is_empty() => Ok(loaded),
        Ok(loaded) => Ok(LoadedConfig {
            config: loaded.config.with_overrides(overrides)?,
            options: loaded.options,
        }),
        Err(WatchsError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            match (&overrides.watch_dir, &overrides.command) {
                (Some(dir), Some(command)) => {
                    info!(
                        config = %path.display(),
                        "config file not found; using command-line values"
                    );
                    let config = WatchConfiguration::new(
                        dir,
                        overrides.file_types.clone().unwrap_or_default(),
                        overrides.exclude_paths.clone().unwrap_or_default(),
                        command.clone(),
                    )?;
                    Ok(LoadedConfig {
                        config,
                        options: OptionsSection::default(),
                    })
                }
                _ => Err(WatchsError::Config(format!(
                    "config file {} not found; create one with `watchs init` or pass both --dir and --cmd",
                    path.display()
                ))),
            }
        }
        Err(err) => Err(err),
    }
}

/// Serialize `raw` as TOML and write it to `path`.
pub fn save_config(raw: &RawConfigFile, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let contents = toml::to_string_pretty(raw)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Validate `raw` and write it to `path`, refusing to clobber an existing
/// file unless `force` is set.
///
/// The written file keeps the directory exactly as given so a project-local
/// config stays portable (`watch_dir = "./"`).
pub fn init_config(path: impl AsRef<Path>, raw: RawConfigFile, force: bool) -> Result<WatchConfiguration> {
    let path = path.as_ref();

    if path.exists() && !force {
        return Err(WatchsError::ConfigExists(path.to_path_buf()));
    }

    let config = WatchConfiguration::try_from(raw.clone())?;
    save_config(&raw, path)?;

    info!(config = %path.display(), "config file written");
    Ok(config)
}

/// Split a comma-separated CLI list, trimming items and dropping empties.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empty_items() {
        assert_eq!(split_list(" .go, .js ,,"), vec![".go", ".js"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }
}
