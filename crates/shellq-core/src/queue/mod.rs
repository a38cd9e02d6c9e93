//! Bounded admission for asynchronous tasks.
//!
//! [`CommandQueue`] lets at most `max_concurrent` tasks run at once and keeps
//! the set of identifiers currently running, so a status poller can report load.
//!
//! ## Admission
//! - A submitter waits on a semaphore permit. Waiters are woken as soon as a
//!   slot frees, in arrival order.
//! - Once a permit is held the id enters the running set, then the task is invoked.
//! - The id leaves the set before the permit is returned, so the set never
//!   outgrows the limit, even for an instant.
//!
//! ## Release
//! Release happens in a drop guard: on success, on failure, when the task
//! panics and when the `submit` future is dropped mid-flight.
mod admission;

use std::{collections::HashSet, fmt::Display, future::Future, hash::Hash, time::Duration};

use parking_lot::Mutex;
use shellq_model::QueueStatus;
use tokio::sync::Semaphore;
use tracing::trace;

use crate::{
    config::QueueConfig,
    error::{ConfigError, QueueError},
};
use admission::Admission;

/// Concurrency-bounded task executor.
///
/// Constructed and owned by the caller; share it behind an `Arc`.
pub struct CommandQueue<I> {
    limit: usize,
    admission_timeout: Option<Duration>,
    task_timeout: Option<Duration>,
    slots: Semaphore,
    running: Mutex<HashSet<I>>,
}

impl<I> CommandQueue<I>
where
    I: Eq + Hash + Clone + Display,
{
    pub fn new(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            limit: config.max_concurrent,
            admission_timeout: config.admission_timeout,
            task_timeout: config.task_timeout,
            slots: Semaphore::new(config.max_concurrent),
            running: Mutex::new(HashSet::new()),
        })
    }

    /// Queue with default settings and the given limit.
    pub fn with_limit(max_concurrent: usize) -> Result<Self, ConfigError> {
        Self::new(QueueConfig::default().with_max_concurrent(max_concurrent))
    }

    /// Run `task` once a slot is free and return its result untouched.
    ///
    /// `task` is only called after admission. Errors produced by the queue
    /// (duplicate id, timeouts, closed queue) are converted into the caller's
    /// error type via `From<QueueError>`.
    pub async fn submit<T, E, F, Fut>(&self, id: I, task: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<QueueError>,
    {
        let admission = self.admit(id).await?;

        let result = match self.task_timeout {
            Some(limit) => match tokio::time::timeout(limit, task()).await {
                Ok(result) => result,
                Err(_) => Err(QueueError::TaskTimeout {
                    id: admission.id().to_string(),
                    timeout_ms: as_millis(limit),
                }
                .into()),
            },
            None => task().await,
        };

        drop(admission);
        result
    }

    async fn admit(&self, id: I) -> Result<Admission<'_, I>, QueueError> {
        if self.running.lock().contains(&id) {
            return Err(QueueError::Duplicate(id.to_string()));
        }

        let acquired = match self.admission_timeout {
            Some(limit) => tokio::time::timeout(limit, self.slots.acquire())
                .await
                .map_err(|_| QueueError::AdmissionTimeout {
                    id: id.to_string(),
                    timeout_ms: as_millis(limit),
                })?,
            None => self.slots.acquire().await,
        };
        let permit = acquired.map_err(|_| QueueError::Closed)?;

        let mut running = self.running.lock();
        // Another submitter with the same id may have been admitted while we waited.
        if !running.insert(id.clone()) {
            return Err(QueueError::Duplicate(id.to_string()));
        }
        trace!(target: "shellq.queue", task = %id, running = running.len(), limit = self.limit, "admitted");
        drop(running);

        Ok(Admission::new(id, &self.running, permit))
    }

    /// Number of admitted, unfinished tasks.
    pub fn running_count(&self) -> usize {
        self.running.lock().len()
    }

    /// Snapshot of admitted, unfinished task ids, in unspecified order.
    pub fn running_ids(&self) -> Vec<I> {
        self.running.lock().iter().cloned().collect()
    }

    pub fn is_running(&self, id: &I) -> bool {
        self.running.lock().contains(id)
    }

    /// Limit, count and ids captured under a single lock.
    pub fn status(&self) -> QueueStatus<I> {
        let running = self.running.lock();
        QueueStatus {
            limit: self.limit,
            running: running.len(),
            ids: running.iter().cloned().collect(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Free slots at the instant of the call.
    pub fn available(&self) -> usize {
        self.limit.saturating_sub(self.running_count())
    }

    /// Stop admitting. Waiting and future submitters get [`QueueError::Closed`];
    /// running tasks are unaffected.
    pub fn close(&self) {
        self.slots.close();
        trace!(target: "shellq.queue", "closed");
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }
}

fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
