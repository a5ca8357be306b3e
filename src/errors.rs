// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("watch directory does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("watch directory is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("command must not be empty")]
    EmptyCommand,

    #[error("config file {0} already exists (use --force to overwrite)")]
    ConfigExists(PathBuf),

    #[error("file notifier error: {0}")]
    Notify(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("command executor has been closed")]
    ExecutorClosed,

    #[error("watch engine has already been stopped")]
    EngineStopped,

    #[error("failed to start command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchsError>;
