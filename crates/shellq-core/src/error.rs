use thiserror::Error;

/// Failures introduced by the queue itself.
///
/// Task failures never become a `QueueError`; they reach the submitter untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("task {0} is already running")]
    Duplicate(String),
    #[error("task {id} waited more than {timeout_ms} ms for a free slot")]
    AdmissionTimeout { id: String, timeout_ms: u64 },
    #[error("task {id} exceeded its {timeout_ms} ms run time limit")]
    TaskTimeout { id: String, timeout_ms: u64 },
    #[error("queue is closed")]
    Closed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency limit must be at least 1, got {0}")]
    InvalidLimit(usize),
    #[error("concurrency limit {limit} exceeds the maximum of {max}")]
    LimitTooLarge { limit: usize, max: usize },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}
