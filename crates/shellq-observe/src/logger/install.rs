use std::io;

use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

impl LoggerConfig {
    /// Install the process-wide `tracing` subscriber.
    ///
    /// Log lines go to stderr; stdout is left to command output.
    pub fn install(&self) -> Result<(), LoggerError> {
        if tracing::dispatcher::has_been_set() {
            return Err(LoggerError::AlreadyInstalled);
        }

        let filter = self.filter()?;
        let output = self.output_layer()?;

        tracing_subscriber::registry()
            .with(output.with_filter(filter))
            .try_init()
            .map_err(|e| LoggerError::Install(e.to_string()))
    }

    fn output_layer(&self) -> Result<OutputLayer, LoggerError> {
        let layer = match self.format {
            LoggerFormat::Text => fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(self.use_color)
                .with_target(self.with_targets)
                .with_timer(local_rfc3339())
                .boxed(),
            LoggerFormat::Json => fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(self.with_targets)
                .with_timer(local_rfc3339())
                .boxed(),
            LoggerFormat::Journald => journald_layer()?,
        };
        Ok(layer)
    }
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.with_syslog_identifier("shellq".into()).boxed())
        .map_err(|e| LoggerError::Install(format!("journald: {e}")))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    Err(LoggerError::JournaldUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_without_feature_is_refused() {
        let cfg = LoggerConfig::for_format(LoggerFormat::Journald);
        assert!(matches!(
            cfg.output_layer(),
            Err(LoggerError::JournaldUnavailable)
        ));
    }

    #[test]
    fn bad_directive_fails_before_installing() {
        let cfg = LoggerConfig::default().with_directive("shellq=loud");
        assert!(matches!(
            cfg.install(),
            Err(LoggerError::BadDirective { .. }) | Err(LoggerError::AlreadyInstalled)
        ));
    }

    #[test]
    fn second_install_is_reported() {
        let cfg = LoggerConfig::for_format(LoggerFormat::Json).with_directive("warn");
        // Another test in this binary may already have installed a subscriber.
        let _ = cfg.install();
        assert_eq!(cfg.install(), Err(LoggerError::AlreadyInstalled));
    }
}
