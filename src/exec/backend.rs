// src/exec/backend.rs

//! Pluggable command backend abstraction.
//!
//! The orchestrator talks to a `CommandBackend` instead of a concrete
//! executor. Production code uses [`CommandExecutor`](super::CommandExecutor);
//! tests can swap in a backend that only records calls.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::errors::Result;

/// Boxed, sendable future used across the backend seam.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs the watched command and owns its process lifecycle.
pub trait CommandBackend: Send + Sync {
    /// Start `command` in `work_dir`, replacing any running instance.
    ///
    /// Implementations may silently ignore calls (e.g. debouncing).
    fn execute<'a>(&'a self, command: &'a str, work_dir: &'a Path) -> BoxFuture<'a, Result<()>>;

    /// Stop the running instance, if any, and wait for it to exit.
    fn terminate(&self) -> BoxFuture<'_, Result<()>>;

    /// Final shutdown: refuse further runs and terminate the running instance.
    fn close(&self) -> BoxFuture<'_, Result<()>>;
}
