use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use watchs::errors::{Result, WatchsError};
use watchs::exec::{BoxFuture, CommandBackend};

/// One recorded `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub command: String,
    pub work_dir: PathBuf,
}

#[derive(Debug, Default)]
struct Recorded {
    runs: Vec<RecordedRun>,
    terminations: usize,
    closed: bool,
}

/// A fake backend that:
/// - records every `execute` call without spawning anything
/// - counts `terminate` calls
/// - rejects `execute` after `close`, like the real executor.
///
/// Clones share the same record, so a test can keep one handle and give
/// the other to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.inner.lock().unwrap().runs.clone()
    }

    pub fn run_count(&self) -> usize {
        self.inner.lock().unwrap().runs.len()
    }

    pub fn terminations(&self) -> usize {
        self.inner.lock().unwrap().terminations
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

impl CommandBackend for RecordingBackend {
    fn execute<'a>(&'a self, command: &'a str, work_dir: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut guard = self.inner.lock().unwrap();
            if guard.closed {
                return Err(WatchsError::ExecutorClosed);
            }
            guard.runs.push(RecordedRun {
                command: command.to_string(),
                work_dir: work_dir.to_path_buf(),
            });
            Ok(())
        })
    }

    fn terminate(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.inner.lock().unwrap().terminations += 1;
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.inner.lock().unwrap().closed = true;
            Ok(())
        })
    }
}
