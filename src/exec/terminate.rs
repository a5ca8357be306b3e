// src/exec/terminate.rs

//! Killing a command together with everything it started.
//!
//! `/bin/sh -c "cargo run"` leaves the real work in grandchildren, so killing
//! only the shell would orphan them. Each platform gets one strategy, picked
//! at compile time through [`PlatformKiller`].

use std::io;

use tokio::process::{Child, Command};

use crate::exec::backend::BoxFuture;

/// Platform strategy for terminating a whole process tree.
pub trait ProcessTreeKiller: Send + Sync {
    /// Adjust the command before spawning so its tree can be killed later.
    fn prepare(&self, cmd: &mut Command);

    /// Ask the OS to kill the tree started as `pid`. Does not wait.
    ///
    /// `child` is `None` once the leader has been reaped; descendants it
    /// left behind must still be killed where the platform allows it.
    fn kill_tree<'a>(&'a self, pid: u32, child: Option<&'a mut Child>) -> BoxFuture<'a, io::Result<()>>;
}

/// Unix: run the command as leader of a fresh process group and `SIGKILL`
/// the group.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessGroupKiller;

#[cfg(unix)]
impl ProcessTreeKiller for ProcessGroupKiller {
    fn prepare(&self, cmd: &mut Command) {
        cmd.process_group(0);
    }

    fn kill_tree<'a>(&'a self, pid: u32, child: Option<&'a mut Child>) -> BoxFuture<'a, io::Result<()>> {
        Box::pin(async move {
            // SAFETY: killpg only sends a signal. The pgid is the spawn pid
            // because of `process_group(0)`, and it cannot be reused while
            // any member of the group is alive.
            let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
            if rc == 0 {
                return Ok(());
            }

            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::ESRCH) {
                // Group already gone.
                return Ok(());
            }

            // Fall back to the leader alone.
            match child.map(|c| c.start_kill()) {
                Some(Ok(())) => Ok(()),
                _ => Err(err),
            }
        })
    }
}

/// Windows: `taskkill /F /T` the PID, which walks the child tree.
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskkillTreeKiller;

#[cfg(windows)]
impl ProcessTreeKiller for TaskkillTreeKiller {
    fn prepare(&self, _cmd: &mut Command) {}

    fn kill_tree<'a>(&'a self, pid: u32, child: Option<&'a mut Child>) -> BoxFuture<'a, io::Result<()>> {
        Box::pin(async move {
            // Without a live leader the PID may already belong to someone else.
            let Some(child) = child else {
                return Ok(());
            };
            if child.id().is_none() {
                return Ok(());
            }

            let pid_arg = pid.to_string();
            // Exit status ignored: the process may have finished already.
            let _ = Command::new("taskkill")
                .args(["/F", "/T", "/PID", pid_arg.as_str()])
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null())
                .status()
                .await;

            match child.start_kill() {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::InvalidInput => Ok(()),
                Err(err) => Err(err),
            }
        })
    }
}

#[cfg(unix)]
pub type PlatformKiller = ProcessGroupKiller;

#[cfg(windows)]
pub type PlatformKiller = TaskkillTreeKiller;
