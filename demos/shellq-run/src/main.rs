use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use shellq_core::{CommandQueue, QueueConfig, host_info, mark_started};
use shellq_exec::{CommandRun, SafetyMode, ShellConfig, ShellRunner, ShellService};
use shellq_model::{CommandId, CommandStatus, HostInfo, QueueStatus};
use shellq_observe::{LoggerConfig, LoggerFormat};

/// Run shell commands through a concurrency-bounded queue.
///
/// Queue and logger settings start from the `SHELLQ_*` environment; flags override it.
#[derive(Debug, Parser)]
#[command(name = "shellq-run", version)]
struct Args {
    /// Maximum number of commands running at once.
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Give up waiting for a slot after this many milliseconds (0 disables).
    #[arg(long)]
    admission_timeout_ms: Option<u64>,

    /// Abort a command after this many milliseconds in the queue's slot (0 disables).
    #[arg(long)]
    task_timeout_ms: Option<u64>,

    /// Shell-level timeout per command.
    #[arg(long, env = "SHELLQ_SHELL_TIMEOUT_MS", default_value_t = 30_000)]
    shell_timeout_ms: u64,

    /// Working directory for all commands.
    #[arg(long, env = "SHELLQ_CWD")]
    cwd: Option<PathBuf>,

    /// Skip the command safety filter.
    #[arg(long = "unsafe")]
    no_safety: bool,

    /// `EnvFilter` directive; overrides SHELLQ_LOG.
    #[arg(long)]
    log_level: Option<String>,

    /// text | json | journald
    #[arg(long)]
    log_format: Option<LoggerFormat>,

    /// Print results as JSON lines.
    #[arg(long)]
    json: bool,

    /// Commands to run, one per argument.
    #[arg(required = true)]
    commands: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<'a> {
    id: CommandId,
    command: &'a str,
    status: CommandStatus,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadReport {
    #[serde(flatten)]
    queue: QueueStatus<CommandId>,
    host: HostInfo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mark_started();
    let args = Args::parse();

    // 1) Logger
    let mut log_cfg = LoggerConfig::from_env().context("logger environment")?;
    if let Some(format) = args.log_format {
        log_cfg = log_cfg.with_format(format);
    }
    if let Some(directive) = &args.log_level {
        log_cfg = log_cfg.with_directive(directive.as_str());
    }
    log_cfg.install()?;

    // 2) Queue
    let mut queue_cfg = QueueConfig::from_env().context("queue environment")?;
    if let Some(limit) = args.max_concurrent {
        queue_cfg.max_concurrent = limit;
    }
    if let Some(ms) = args.admission_timeout_ms {
        queue_cfg.admission_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
    if let Some(ms) = args.task_timeout_ms {
        queue_cfg.task_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
    let queue = Arc::new(CommandQueue::new(queue_cfg).context("invalid queue configuration")?);
    info!(limit = queue.limit(), "queue ready");

    // 3) Shell runner
    let safety = if args.no_safety {
        warn!("command safety filter disabled");
        SafetyMode::Off
    } else {
        SafetyMode::Enforce
    };
    let shell_cfg = ShellConfig::default()
        .with_timeout(Duration::from_millis(args.shell_timeout_ms))
        .with_safety(safety);
    let runner = match &args.cwd {
        Some(cwd) => ShellRunner::with_cwd(shell_cfg, cwd)?,
        None => ShellRunner::new(shell_cfg)?,
    };
    info!(cwd = %runner.cwd().display(), "shell runner ready");

    let service = Arc::new(ShellService::new(Arc::clone(&queue), Arc::new(runner)));

    // 4) Ctrl-C cancels in-flight shells
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        let queue = Arc::clone(&queue);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted; cancelling running commands");
                queue.close();
                cancel.cancel();
            }
        });
    }

    // 5) Submit everything at once; the queue does the pacing
    let mut handles = Vec::with_capacity(args.commands.len());
    for command in args.commands.iter().cloned() {
        let service = Arc::clone(&service);
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let run = service.execute_with_cancel(&command, &cancel).await;
            (command, run)
        }));
    }

    let mut failed = 0usize;
    for handle in handles {
        let (command, run) = handle.await?;
        if run.status() == CommandStatus::Error {
            failed += 1;
        }
        print_run(&command, &run, args.json)?;
    }

    print_load(service.status(), args.json)?;

    if failed > 0 {
        anyhow::bail!("{failed} command(s) failed");
    }
    Ok(())
}

fn print_run(command: &str, run: &CommandRun, json: bool) -> anyhow::Result<()> {
    if json {
        let report = RunReport {
            id: run.id,
            command,
            status: run.status(),
            output: run.text(),
            exit_code: run.outcome.as_ref().ok().map(|o| o.exit_code),
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("[{}] {} ({})", run.id, command, run.status().as_str());
        let text = run.text();
        if !text.is_empty() {
            println!("{}", text.trim_end());
        }
    }
    Ok(())
}

fn print_load(queue: QueueStatus<CommandId>, json: bool) -> anyhow::Result<()> {
    let report = LoadReport {
        queue,
        host: host_info(),
    };
    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "load: {}/{} running, up {}s on {} ({})",
            report.queue.running,
            report.queue.limit,
            report.host.uptime_seconds,
            report.host.os,
            report.host.arch
        );
    }
    Ok(())
}
