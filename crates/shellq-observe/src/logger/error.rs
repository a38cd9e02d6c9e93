use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggerError {
    #[error("unknown log format {0:?}; use text, json or journald")]
    UnknownFormat(String),
    #[error("journald output needs Linux and the `journald` feature")]
    JournaldUnavailable,
    #[error("bad log directive {directive:?}: {reason}")]
    BadDirective { directive: String, reason: String },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
    #[error("cannot install logger: {0}")]
    Install(String),
}
