use shellq_core::QueueError;
use thiserror::Error;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("command blocked for security reasons: {0}")]
    Blocked(String),
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("command timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("command output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },
    #[error("non-zero exit code: {code}")]
    NonZeroExit { code: i32 },
    #[error("killed by signal")]
    KilledBySignal,
    #[error("cancelled")]
    Cancelled,
    #[error("not a directory: {0}")]
    InvalidDirectory(String),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}
