// src/config/mod.rs

//! Configuration loading and validation for watchs.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the validated
//!   [`WatchConfiguration`] value (`model.rs`).
//! - Load / save a config file and merge command-line overrides (`loader.rs`).
//! - Validate the invariants of a watch configuration (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    init_config, load_and_validate, load_from_path, load_or_create,
    save_config, split_list, LoadedConfig, DEFAULT_CONFIG_FILE,
};
pub use model::{
    ConfigOverrides, EngineOptions, OptionsSection, RawConfigFile, WatchConfiguration,
    DEFAULT_DEBOUNCE, DEFAULT_SETTLE_DELAY,
};
