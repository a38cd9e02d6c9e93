mod config;
pub use config::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT, SafetyMode, ShellConfig};

mod output;
pub use output::ShellOutput;

use std::{
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use parking_lot::Mutex;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::{Child, Command},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    error::{ExecError, ExecResult},
    safety,
    util::{kill_graceful, program_command, shell_command},
};

/// Runs command strings through the system shell.
///
/// The runner owns its working directory; changing it never touches the
/// process-wide current directory.
pub struct ShellRunner {
    cfg: ShellConfig,
    cwd: Mutex<PathBuf>,
}

enum Finish {
    Exited {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    Aborted(ExecError),
}

impl ShellRunner {
    /// Runner rooted at the process's current directory.
    pub fn new(cfg: ShellConfig) -> ExecResult<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self {
            cfg,
            cwd: Mutex::new(cwd),
        })
    }

    /// Runner rooted at `cwd`, which must be an existing directory.
    pub fn with_cwd(cfg: ShellConfig, cwd: impl AsRef<Path>) -> ExecResult<Self> {
        let cwd = resolve_dir(cwd.as_ref())?;
        Ok(Self {
            cfg,
            cwd: Mutex::new(cwd),
        })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.cfg
    }

    pub fn cwd(&self) -> PathBuf {
        self.cwd.lock().clone()
    }

    /// Move to `path`; relative paths resolve against the current directory.
    pub fn change_dir(&self, path: impl AsRef<Path>) -> ExecResult<PathBuf> {
        let mut cwd = self.cwd.lock();
        let target = resolve_dir(&cwd.join(path.as_ref()))?;
        debug!(target: "shellq.exec.shell", from = %cwd.display(), to = %target.display(), "change dir");
        *cwd = target.clone();
        Ok(target)
    }

    pub async fn run(&self, command: &str) -> ExecResult<ShellOutput> {
        self.run_with_cancel(command, &CancellationToken::new()).await
    }

    /// Run `command`, killing the child when `cancel` fires.
    pub async fn run_with_cancel(
        &self,
        command: &str,
        cancel: &CancellationToken,
    ) -> ExecResult<ShellOutput> {
        if self.cfg.safety.is_enforced()
            && let Some(refusal) = safety::refusal(command)
        {
            debug!(target: "shellq.exec.shell", %command, %refusal, "blocked");
            return Err(ExecError::Blocked(refusal.to_string()));
        }

        self.execute(shell_command(command), command, cancel).await
    }

    /// Fetch `url` into `destination` (relative to the runner's directory).
    ///
    /// curl is spawned directly, so neither argument is seen by a shell.
    pub async fn download(&self, url: &str, destination: &str) -> ExecResult<ShellOutput> {
        let args = download_args(url, destination)?;
        let label = format!("{DOWNLOAD_PROGRAM} {}", args.join(" "));
        self.execute(program_command(DOWNLOAD_PROGRAM, &args), &label, &CancellationToken::new())
            .await
    }

    async fn execute(
        &self,
        mut cmd: Command,
        command: &str,
        cancel: &CancellationToken,
    ) -> ExecResult<ShellOutput> {
        cmd.current_dir(self.cwd())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (k, v) in &self.cfg.env {
            cmd.env(k, v);
        }

        trace!(target: "shellq.exec.shell", %command, "spawn");
        let mut child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(e.to_string()))?;

        let max = self.cfg.max_output_bytes;
        let timeout_ms = u64::try_from(self.cfg.timeout.as_millis()).unwrap_or(u64::MAX);

        let finish = tokio::select! {
            res = tokio::time::timeout(self.cfg.timeout, capture(&mut child, max)) => {
                res.unwrap_or(Finish::Aborted(ExecError::Timeout { timeout_ms }))
            }
            _ = cancel.cancelled() => Finish::Aborted(ExecError::Cancelled),
        };

        match finish {
            Finish::Exited {
                status,
                stdout,
                stderr,
            } => self.exit_output(command, status, stdout, stderr),
            Finish::Aborted(err) => {
                debug!(target: "shellq.exec.shell", %command, error = %err, "aborting; killing child");
                if let Err(e) = kill_graceful(&mut child).await {
                    warn!(target: "shellq.exec.shell", %command, error = %e, "kill failed");
                }
                Err(err)
            }
        }
    }

    fn exit_output(
        &self,
        command: &str,
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    ) -> ExecResult<ShellOutput> {
        let Some(code) = status.code() else {
            debug!(target: "shellq.exec.shell", %command, "terminated by signal");
            return Err(ExecError::KilledBySignal);
        };
        if code != 0 && self.cfg.fail_on_non_zero {
            debug!(target: "shellq.exec.shell", %command, code, "exit non-zero");
            return Err(ExecError::NonZeroExit { code });
        }

        trace!(target: "shellq.exec.shell", %command, code, "exit");
        Ok(ShellOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: code,
        })
    }
}

pub const DOWNLOAD_PROGRAM: &str = "curl";

/// Argument vector for `curl -L <url> -o <destination>`.
///
/// A url starting with `-` would be read as an option and is refused.
pub fn download_args(url: &str, destination: &str) -> ExecResult<Vec<String>> {
    if url.is_empty() || destination.is_empty() {
        return Err(ExecError::Blocked("empty download argument".into()));
    }
    if url.starts_with('-') {
        return Err(ExecError::Blocked(format!("download url looks like an option: {url}")));
    }
    Ok(vec![
        "-L".into(),
        url.to_string(),
        "-o".into(),
        destination.to_string(),
    ])
}

fn resolve_dir(path: &Path) -> ExecResult<PathBuf> {
    let invalid = || ExecError::InvalidDirectory(path.display().to_string());
    let resolved = std::fs::canonicalize(path).map_err(|_| invalid())?;
    if !resolved.is_dir() {
        return Err(invalid());
    }
    Ok(resolved)
}

async fn capture(child: &mut Child, max: usize) -> Finish {
    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Finish::Aborted(ExecError::Io("child output is not piped".into()));
    };

    let (stdout, stderr) =
        match tokio::try_join!(read_capped(stdout, max), read_capped(stderr, max)) {
            Ok(streams) => streams,
            Err(e) => return Finish::Aborted(e),
        };

    match child.wait().await {
        Ok(status) => Finish::Exited {
            status,
            stdout,
            stderr,
        },
        Err(e) => Finish::Aborted(e.into()),
    }
}

async fn read_capped<R>(reader: R, max: usize) -> ExecResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let cap = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
    reader.take(cap).read_to_end(&mut buf).await?;
    if buf.len() > max {
        return Err(ExecError::OutputTooLarge { limit: max });
    }
    Ok(buf)
}
