// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! `watchs` without a subcommand behaves like `watchs watch`, so
//! `watchs --cmd "cargo test" --dir .` works directly.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{split_list, ConfigOverrides, DEFAULT_CONFIG_FILE};

/// Command-line arguments for `watchs`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchs",
    version,
    about = "Re-run a shell command whenever files in a directory change.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Watch options used when no subcommand is given.
    #[command(flatten)]
    pub watch: WatchArgs,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Watch a directory and re-run the command on changes (default).
    Watch(WatchArgs),
    /// Write a config file.
    Init(InitArgs),
    /// Print version information.
    Version,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory to watch (overrides the config file).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Comma-separated extensions to watch, e.g. ".go,.js" (overrides the config file).
    #[arg(long, value_name = "LIST")]
    pub types: Option<String>,

    /// Comma-separated paths or globs to ignore (overrides the config file).
    #[arg(long, value_name = "LIST")]
    pub exclude: Option<String>,

    /// Command to run on change (overrides the config file).
    #[arg(long = "cmd", value_name = "COMMAND")]
    pub cmd: Option<String>,

    /// Minimum milliseconds between two runs (0 = default 500).
    #[arg(long, value_name = "MS")]
    pub debounce: Option<u64>,

    /// Milliseconds to wait after a change before running.
    #[arg(long, value_name = "MS")]
    pub settle: Option<u64>,

    /// Resolve and print the configuration, but don't watch or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl WatchArgs {
    /// Overrides implied by the flags that were actually given.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            watch_dir: self.dir.clone(),
            file_types: self.types.as_deref().map(split_list),
            exclude_paths: self.exclude.as_deref().map(split_list),
            command: self.cmd.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Where to write the config file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory to watch.
    #[arg(long, value_name = "DIR", default_value = "./")]
    pub dir: String,

    /// Comma-separated extensions to watch, e.g. ".go,.js".
    #[arg(long, value_name = "LIST", default_value = "")]
    pub types: String,

    /// Comma-separated paths or globs to ignore.
    #[arg(long, value_name = "LIST", default_value = "")]
    pub exclude: String,

    /// Command to run on change.
    #[arg(long = "cmd", value_name = "COMMAND", default_value = "echo files changed")]
    pub cmd: String,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_flags_mean_watch() {
        let args = CliArgs::parse_from(["watchs", "--dir", "src", "--cmd", "make", "--types", ".c, .h"]);
        assert!(args.command.is_none());
        let o = args.watch.overrides();
        assert_eq!(o.watch_dir, Some(PathBuf::from("src")));
        assert_eq!(o.command.as_deref(), Some("make"));
        assert_eq!(o.file_types, Some(vec![".c".to_string(), ".h".to_string()]));
        assert_eq!(o.exclude_paths, None);
    }

    #[test]
    fn init_has_defaults() {
        let args = CliArgs::parse_from(["watchs", "init"]);
        match args.command {
            Some(Command::Init(init)) => {
                assert_eq!(init.config, PathBuf::from(DEFAULT_CONFIG_FILE));
                assert_eq!(init.dir, "./");
                assert_eq!(init.cmd, "echo files changed");
                assert!(!init.force);
            }
            other => panic!("expected init, got {other:?}"),
        }
    }

    #[test]
    fn log_level_is_global() {
        let args = CliArgs::parse_from(["watchs", "version", "--log-level", "debug"]);
        assert!(matches!(args.command, Some(Command::Version)));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
