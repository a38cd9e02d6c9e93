use std::{collections::HashSet, sync::Arc};

use parking_lot::Mutex;
use shellq_core::CommandQueue;
use shellq_model::{CommandId, CommandIdGen, CommandStatus, QueueStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    error::ExecResult,
    shell::{ShellOutput, ShellRunner},
};

/// Outcome of one queued command, tagged with the id it ran under.
#[derive(Debug)]
pub struct CommandRun {
    pub id: CommandId,
    pub outcome: ExecResult<ShellOutput>,
}

impl CommandRun {
    pub fn status(&self) -> CommandStatus {
        match &self.outcome {
            Ok(output) => output.status(),
            Err(_) => CommandStatus::Error,
        }
    }

    /// User-facing text: command output, or the error message.
    pub fn text(&self) -> String {
        match &self.outcome {
            Ok(output) => output.text().to_string(),
            Err(e) => e.to_string(),
        }
    }
}

/// Shell commands admitted through a shared [`CommandQueue`].
///
/// Each call to [`ShellService::execute`] gets the next [`CommandId`].
/// Ids waiting for a slot are tracked here; admitted ids live in the queue.
pub struct ShellService {
    queue: Arc<CommandQueue<CommandId>>,
    runner: Arc<ShellRunner>,
    ids: CommandIdGen,
    waiting: Mutex<HashSet<CommandId>>,
}

/// Keeps an id in the waiting set until admission or until the request is dropped.
struct Waiting<'a> {
    id: CommandId,
    set: &'a Mutex<HashSet<CommandId>>,
}

impl<'a> Waiting<'a> {
    fn enter(id: CommandId, set: &'a Mutex<HashSet<CommandId>>) -> Self {
        set.lock().insert(id);
        Self { id, set }
    }
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

impl ShellService {
    pub fn new(queue: Arc<CommandQueue<CommandId>>, runner: Arc<ShellRunner>) -> Self {
        Self {
            queue,
            runner,
            ids: CommandIdGen::new(),
            waiting: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_ids(mut self, ids: CommandIdGen) -> Self {
        self.ids = ids;
        self
    }

    pub fn queue(&self) -> &Arc<CommandQueue<CommandId>> {
        &self.queue
    }

    pub fn runner(&self) -> &Arc<ShellRunner> {
        &self.runner
    }

    pub async fn execute(&self, command: &str) -> CommandRun {
        self.execute_with_cancel(command, &CancellationToken::new())
            .await
    }

    pub async fn execute_with_cancel(&self, command: &str, cancel: &CancellationToken) -> CommandRun {
        let id = self.ids.next_id();
        debug!(target: "shellq.exec.service", %id, %command, "queued");

        let waiting = Waiting::enter(id, &self.waiting);
        let runner = &self.runner;
        let outcome = self
            .queue
            .submit(id, move || {
                drop(waiting);
                runner.run_with_cancel(command, cancel)
            })
            .await;

        match &outcome {
            Ok(output) => {
                debug!(target: "shellq.exec.service", %id, code = output.exit_code, "finished")
            }
            Err(e) => warn!(target: "shellq.exec.service", %id, error = %e, "command failed"),
        }
        CommandRun { id, outcome }
    }

    pub fn status(&self) -> QueueStatus<CommandId> {
        self.queue.status()
    }

    /// `Pending` while waiting for a slot, `Running` once admitted.
    ///
    /// `None` for ids that finished or were never issued; the final status
    /// travels with the [`CommandRun`] returned to the caller.
    pub fn command_status(&self, id: CommandId) -> Option<CommandStatus> {
        if self.queue.is_running(&id) {
            Some(CommandStatus::Running)
        } else if self.waiting.lock().contains(&id) {
            Some(CommandStatus::Pending)
        } else {
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::collections::HashSet;

    use shellq_core::{QueueConfig, QueueError};
    use tokio::sync::oneshot;

    use super::*;
    use crate::{ExecError, ShellConfig};

    fn service(limit: usize) -> (tempfile::TempDir, ShellService) {
        let dir = tempfile::tempdir().unwrap();
        let queue = CommandQueue::new(QueueConfig::default().with_max_concurrent(limit)).unwrap();
        let runner = ShellRunner::with_cwd(ShellConfig::default(), dir.path()).unwrap();
        (dir, ShellService::new(Arc::new(queue), Arc::new(runner)))
    }

    async fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..1_000 {
            if cond() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn execute_assigns_increasing_ids() {
        let (_dir, svc) = service(2);

        let first = svc.execute("echo one").await;
        let second = svc.execute("echo two").await;

        assert_eq!(first.id, CommandId::new(1));
        assert_eq!(second.id, CommandId::new(2));
        assert_eq!(first.text(), "one\n");
        assert_eq!(second.status(), CommandStatus::Completed);
    }

    #[tokio::test]
    async fn concurrent_commands_all_complete_and_release() {
        let (_dir, svc) = service(2);

        let (a, b, c) = tokio::join!(
            svc.execute("echo a"),
            svc.execute("echo b"),
            svc.execute("echo c"),
        );

        let ids: HashSet<CommandId> = [a.id, b.id, c.id].into_iter().collect();
        assert_eq!(ids.len(), 3);
        for run in [&a, &b, &c] {
            assert_eq!(run.status(), CommandStatus::Completed);
        }
        assert_eq!(svc.status().running, 0);
    }

    #[tokio::test]
    async fn blocked_command_reports_error_status() {
        let (_dir, svc) = service(2);
        let run = svc.execute("whoami").await;

        assert!(matches!(run.outcome, Err(ExecError::Blocked(_))));
        assert_eq!(run.status(), CommandStatus::Error);
        assert!(run.text().contains("blocked"));
        assert_eq!(svc.status().running, 0);
    }

    #[tokio::test]
    async fn queue_errors_surface_through_exec_error() {
        let (_dir, svc) = service(1);
        svc.queue().close();

        let run = svc.execute("echo late").await;
        assert_eq!(run.outcome, Err(ExecError::Queue(QueueError::Closed)));
        assert_eq!(run.text(), "queue is closed");
    }

    #[tokio::test]
    async fn command_status_follows_the_lifecycle() {
        let (_dir, svc) = service(1);
        let svc = Arc::new(svc);

        // Occupy the only slot so the next command has to wait.
        let blocker = CommandId::new(999);
        let (tx, rx) = oneshot::channel::<()>();
        let holder = {
            let queue = Arc::clone(svc.queue());
            tokio::spawn(async move {
                queue
                    .submit(blocker, || async move {
                        let _ = rx.await;
                        Ok::<_, QueueError>(())
                    })
                    .await
            })
        };
        wait_until(|| svc.command_status(blocker) == Some(CommandStatus::Running)).await;

        let run = {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move { svc.execute("echo late").await })
        };
        let id = CommandId::new(1);
        wait_until(|| svc.command_status(id) == Some(CommandStatus::Pending)).await;
        assert_eq!(svc.status().ids, vec![blocker]);

        tx.send(()).unwrap();
        holder.await.unwrap().unwrap();
        let run = run.await.unwrap();

        assert_eq!(run.id, id);
        assert_eq!(run.status(), CommandStatus::Completed);
        assert_eq!(svc.command_status(id), None);
        assert_eq!(svc.command_status(CommandId::new(77)), None);
    }

    #[tokio::test]
    async fn rejected_command_leaves_no_pending_entry() {
        let (_dir, svc) = service(1);
        svc.queue().close();

        let run = svc.execute("echo late").await;
        assert!(run.outcome.is_err());
        assert_eq!(svc.command_status(run.id), None);
    }

    #[tokio::test]
    async fn custom_id_source_is_used() {
        let (_dir, svc) = service(1);
        let svc = svc.with_ids(CommandIdGen::starting_at(100));
        assert_eq!(svc.execute("pwd").await.id, CommandId::new(100));
    }
}
