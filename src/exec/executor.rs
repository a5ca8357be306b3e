// src/exec/executor.rs

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::process::Child;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_DEBOUNCE;
use crate::errors::{Result, WatchsError};
use crate::exec::backend::{BoxFuture, CommandBackend};
use crate::exec::shell::shell_command;
use crate::exec::terminate::{PlatformKiller, ProcessTreeKiller};

struct ExecutorState {
    /// Leader of the one command we may have alive, until it is reaped.
    child: Option<Child>,
    /// Spawn pid of that command. Outlives `child`: background members of
    /// the tree can keep running after the leader has exited.
    group: Option<u32>,
    /// When the last accepted `execute` happened.
    last_run: Option<Instant>,
}

/// Runs the watched command, at most one instance at a time.
///
/// - Debounce is leading-edge with a fixed window: a call within `debounce`
///   of the last *accepted* call is dropped and does not extend the window.
/// - An accepted call first kills the running instance (whole process tree)
///   and waits for it to exit.
/// - After [`close`](Self::close) every `execute` fails with
///   [`WatchsError::ExecutorClosed`].
///
/// All transitions go through one async mutex, so a trigger can never race
/// a terminate.
pub struct CommandExecutor {
    state: Mutex<ExecutorState>,
    debounce: Duration,
    closed: CancellationToken,
    killer: PlatformKiller,
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("debounce", &self.debounce)
            .field("closed", &self.closed.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl CommandExecutor {
    /// A zero `debounce` means the default of 500 ms.
    pub fn new(debounce: Duration) -> Self {
        let debounce = if debounce.is_zero() {
            DEFAULT_DEBOUNCE
        } else {
            debounce
        };

        Self {
            state: Mutex::new(ExecutorState {
                child: None,
                group: None,
                last_run: None,
            }),
            debounce,
            closed: CancellationToken::new(),
            killer: PlatformKiller::default(),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Run `command` through the platform shell in `work_dir`.
    ///
    /// Returns once the process has been started; it is not awaited.
    pub async fn execute(&self, command: &str, work_dir: &Path) -> Result<()> {
        let mut state = self.state.lock().await;

        if self.closed.is_cancelled() {
            return Err(WatchsError::ExecutorClosed);
        }

        let now = Instant::now();
        if let Some(last) = state.last_run {
            if now.duration_since(last) < self.debounce {
                debug!(command, "within debounce window; skipping run");
                return Ok(());
            }
        }
        state.last_run = Some(now);

        if let Err(err) = self.terminate_locked(&mut state).await {
            warn!(error = %err, "failed to terminate previous command");
        }

        info!(command, dir = %work_dir.display(), "running command");

        let mut cmd = shell_command(command, work_dir);
        self.killer.prepare(&mut cmd);

        let child = cmd.spawn().map_err(|source| WatchsError::Spawn {
            command: command.to_string(),
            source,
        })?;
        debug!(pid = ?child.id(), "command started");

        state.group = child.id();
        state.child = Some(child);
        Ok(())
    }

    /// Kill the running command tree, if any, and wait until it has exited.
    pub async fn terminate(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.terminate_locked(&mut state).await
    }

    /// Refuse further runs and terminate the running command. Idempotent.
    pub async fn close(&self) -> Result<()> {
        self.closed.cancel();
        let mut state = self.state.lock().await;
        self.terminate_locked(&mut state).await
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// PID of the tracked process while it is still alive.
    ///
    /// A leader that has exited on its own is reaped here; its process group
    /// stays tracked so the next terminate still sweeps it.
    pub async fn running_pid(&self) -> Option<u32> {
        let mut state = self.state.lock().await;
        let child = state.child.as_mut()?;
        match child.try_wait() {
            Ok(None) => child.id(),
            Ok(Some(status)) => {
                debug!(%status, "command already exited");
                state.child = None;
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to poll command status");
                child.id()
            }
        }
    }

    /// Must be called with the state lock held.
    ///
    /// The group is always signalled, even when the leader has already
    /// exited. The handle stays tracked until the leader is reaped, so an
    /// interrupted terminate is retried by the next one; any error still
    /// clears it.
    async fn terminate_locked(&self, state: &mut ExecutorState) -> Result<()> {
        let Some(pid) = state.group else {
            return Ok(());
        };

        let leader_exited = match state.child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(Some(status))) => {
                info!(%status, "previous command finished");
                true
            }
            Some(_) => false,
            None => true,
        };
        if leader_exited {
            state.child = None;
        }

        info!(pid, "terminating command process tree");

        let killed = self.killer.kill_tree(pid, state.child.as_mut()).await;
        let waited = match state.child.as_mut() {
            Some(child) => child.wait().await.map(Some),
            None => Ok(None),
        };
        state.child = None;
        state.group = None;

        killed?;
        if let Some(status) = waited? {
            debug!(pid, %status, "command exited");
        }
        Ok(())
    }
}

impl CommandBackend for CommandExecutor {
    fn execute<'a>(&'a self, command: &'a str, work_dir: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(CommandExecutor::execute(self, command, work_dir))
    }

    fn terminate(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(CommandExecutor::terminate(self))
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(CommandExecutor::close(self))
    }
}
