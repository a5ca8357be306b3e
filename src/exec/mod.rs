// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the watched command with `tokio::process::Command` and
//! owns the lifecycle of the single running instance.
//!
//! - [`executor`] holds [`CommandExecutor`]: debounce, replace-on-trigger,
//!   terminate-and-wait, close.
//! - [`shell`] builds the platform shell invocation.
//! - [`terminate`] provides the per-platform process-tree kill strategy.
//! - [`backend`] provides the `CommandBackend` trait the orchestrator talks
//!   to, which tests can replace with a recording fake.

pub mod backend;
pub mod executor;
pub mod shell;
pub mod terminate;

pub use backend::{BoxFuture, CommandBackend};
pub use executor::CommandExecutor;
pub use terminate::{PlatformKiller, ProcessTreeKiller};
