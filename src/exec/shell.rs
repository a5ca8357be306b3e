// src/exec/shell.rs

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

/// Build a shell invocation of `command` appropriate for the platform.
///
/// The child shares this process's stdout/stderr and runs in `work_dir`.
pub fn shell_command(command: &str, work_dir: &Path) -> Command {
    let mut cmd = platform_shell(command);

    cmd.current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    cmd
}

#[cfg(unix)]
fn platform_shell(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn platform_shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn runs_through_posix_shell() {
        let cmd = shell_command("echo hi", Path::new("/tmp"));
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "/bin/sh");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, ["-c", "echo hi"]);
        assert_eq!(std_cmd.get_current_dir(), Some(Path::new("/tmp")));
    }
}
