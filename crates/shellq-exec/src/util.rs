use std::time::Duration;

use tokio::process::{Child, Command};

/// Grace period between SIGTERM and SIGKILL.
#[cfg_attr(not(unix), allow(dead_code))]
const TERM_GRACE: Duration = Duration::from_millis(250);

/// `sh -c <script>` (or `cmd /C <script>` on Windows).
///
/// On Unix the child leads its own process group so the whole pipeline can be signalled.
pub fn shell_command(script: &str) -> Command {
    cfg_if::cfg_if! {
        if #[cfg(target_family = "windows")] {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(script);
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(script);
            cmd.process_group(0);
        }
    }
    cmd
}

/// `program args...`, spawned without a shell.
pub fn program_command(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

#[cfg(unix)]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    // Already reaped.
    let Some(pid) = child.id().and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return Ok(());
    };

    signal_group(pid, libc::SIGTERM);
    if tokio::time::timeout(TERM_GRACE, child.wait()).await.is_ok() {
        return Ok(());
    }

    signal_group(pid, libc::SIGKILL);
    child.kill().await
}

#[cfg(unix)]
fn signal_group(pid: libc::pid_t, signal: libc::c_int) {
    // SAFETY: plain syscall; a stale pid only yields ESRCH.
    unsafe {
        libc::kill(-pid, signal);
    }
}

#[cfg(target_family = "windows")]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    child.kill().await
}
