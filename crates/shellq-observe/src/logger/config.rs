use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::logger::{error::LoggerError, format::LoggerFormat};

/// `EnvFilter` directive variable, e.g. `SHELLQ_LOG=shellq.queue=trace,info`.
pub const ENV_LOG: &str = "SHELLQ_LOG";
pub const ENV_LOG_FORMAT: &str = "SHELLQ_LOG_FORMAT";

/// Logger settings.
///
/// The filter directive is resolved when the logger is installed: an explicit
/// [`directive`](Self::directive) wins, otherwise `SHELLQ_LOG` is read,
/// otherwise everything at `info` and above is kept.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub directive: Option<String>,
    /// Show event targets such as `shellq.queue` or `shellq.exec.shell`.
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::for_format(LoggerFormat::default())
    }
}

impl LoggerConfig {
    /// Defaults for `format`. Colour is on only for text on a terminal stderr.
    pub fn for_format(format: LoggerFormat) -> Self {
        Self {
            format,
            directive: None,
            with_targets: true,
            use_color: format.supports_color() && atty::is(atty::Stream::Stderr),
        }
    }

    /// Format taken from `SHELLQ_LOG_FORMAT`; the directive stays with `SHELLQ_LOG`.
    pub fn from_env() -> Result<Self, LoggerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(ENV_LOG_FORMAT).filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => Ok(Self::for_format(raw.parse()?)),
            None => Ok(Self::default()),
        }
    }

    pub fn with_format(self, format: LoggerFormat) -> Self {
        Self {
            directive: self.directive,
            with_targets: self.with_targets,
            ..Self::for_format(format)
        }
    }

    /// Override `SHELLQ_LOG`. A blank directive is ignored.
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        let directive = directive.into();
        self.directive = (!directive.trim().is_empty()).then_some(directive);
        self
    }

    pub(crate) fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .with_env_var(ENV_LOG);

        match &self.directive {
            Some(directive) => builder.parse(directive).map_err(|e| LoggerError::BadDirective {
                directive: directive.clone(),
                reason: e.to_string(),
            }),
            None => builder.from_env().map_err(|e| LoggerError::BadDirective {
                directive: std::env::var(ENV_LOG).unwrap_or_default(),
                reason: e.to_string(),
            }),
        }
    }
}
