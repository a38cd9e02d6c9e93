//! Process-wide logging for shellq binaries.
//!
//! Build a [`LoggerConfig`] (usually [`LoggerConfig::from_env`]) and call
//! [`LoggerConfig::install`] once, early in `main`.
mod config;
mod error;
mod format;
mod install;

pub use config::{ENV_LOG, ENV_LOG_FORMAT, LoggerConfig};
pub use error::LoggerError;
pub use format::LoggerFormat;
