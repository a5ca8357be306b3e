// src/engine/mod.rs

//! Orchestration engine for watchs.
//!
//! [`WatchOrchestrator`] owns the start/stop lifecycle and binds the
//! directory monitor's events to the command backend.

pub mod orchestrator;

pub use orchestrator::{OrchestratorState, WatchOrchestrator};
