// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which paths matter ([`policy`]).
//! - Normalising raw `notify` events into [`FileEvent`]s ([`event`]).
//! - Keeping a cross-platform watch on a directory tree, including
//!   directories created later, and fanning events out to handlers
//!   ([`monitor`]).
//!
//! It does **not** know about commands; handlers decide what an event means.

pub mod event;
pub mod monitor;
pub mod policy;

pub use event::{FileEvent, FileEventKind};
pub use monitor::{DirectoryMonitor, EventHandler, HandlerFuture};
pub use policy::MatchPolicy;
