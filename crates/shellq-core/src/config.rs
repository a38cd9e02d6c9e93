use std::{str::FromStr, time::Duration};

use shellq_model::DEFAULT_MAX_CONCURRENT;
use tokio::sync::Semaphore;

use crate::error::ConfigError;

pub const ENV_MAX_CONCURRENT: &str = "SHELLQ_MAX_CONCURRENT";
pub const ENV_ADMISSION_TIMEOUT_MS: &str = "SHELLQ_ADMISSION_TIMEOUT_MS";
pub const ENV_TASK_TIMEOUT_MS: &str = "SHELLQ_TASK_TIMEOUT_MS";

/// Largest accepted `max_concurrent`; bounded by the semaphore's permit count.
pub const MAX_CONCURRENT_LIMIT: usize = Semaphore::MAX_PERMITS;

/// Admission settings for a [`CommandQueue`](crate::CommandQueue).
///
/// Both timeouts are off by default: a submitter may wait forever for a slot,
/// and a task that never resolves keeps its slot forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of tasks admitted at the same time.
    pub max_concurrent: usize,
    /// Give up waiting for a free slot after this long.
    pub admission_timeout: Option<Duration>,
    /// Abort an admitted task that runs longer than this.
    pub task_timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            admission_timeout: None,
            task_timeout: None,
        }
    }
}

impl QueueConfig {
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_admission_timeout(mut self, timeout: Duration) -> Self {
        self.admission_timeout = Some(timeout);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::InvalidLimit(self.max_concurrent));
        }
        if self.max_concurrent > MAX_CONCURRENT_LIMIT {
            return Err(ConfigError::LimitTooLarge {
                limit: self.max_concurrent,
                max: MAX_CONCURRENT_LIMIT,
            });
        }
        Ok(())
    }

    /// Defaults overridden by `SHELLQ_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`QueueConfig::from_env`] with an arbitrary variable source.
    ///
    /// A timeout of `0` ms disables that timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(limit) = parse_var::<usize, _>(&lookup, ENV_MAX_CONCURRENT)? {
            cfg.max_concurrent = limit;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_ADMISSION_TIMEOUT_MS)? {
            cfg.admission_timeout = millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_TASK_TIMEOUT_MS)? {
            cfg.task_timeout = millis(ms);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_matches_parity_settings() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.max_concurrent, 5);
        assert!(cfg.admission_timeout.is_none());
        assert!(cfg.task_timeout.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let cfg = QueueConfig::default().with_max_concurrent(0);
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidLimit(0)));
    }

    #[test]
    fn limit_above_permit_ceiling_is_rejected() {
        let cfg = QueueConfig::default().with_max_concurrent(usize::MAX);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::LimitTooLarge {
                limit: usize::MAX,
                max: MAX_CONCURRENT_LIMIT
            })
        );
        assert!(
            QueueConfig::default()
                .with_max_concurrent(MAX_CONCURRENT_LIMIT)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn lookup_overrides_defaults() {
        let cfg = QueueConfig::from_lookup(lookup(&[
            (ENV_MAX_CONCURRENT, "2"),
            (ENV_ADMISSION_TIMEOUT_MS, "250"),
            (ENV_TASK_TIMEOUT_MS, "0"),
        ]))
        .unwrap();

        assert_eq!(cfg.max_concurrent, 2);
        assert_eq!(cfg.admission_timeout, Some(Duration::from_millis(250)));
        assert!(cfg.task_timeout.is_none());
    }

    #[test]
    fn empty_lookup_gives_defaults() {
        let cfg = QueueConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, QueueConfig::default());
    }

    #[test]
    fn garbage_value_names_the_variable() {
        let err = QueueConfig::from_lookup(lookup(&[(ENV_MAX_CONCURRENT, "many")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                key: ENV_MAX_CONCURRENT,
                value: "many".into()
            }
        );
    }

    #[test]
    fn zero_limit_from_lookup_fails_validation() {
        let err = QueueConfig::from_lookup(lookup(&[(ENV_MAX_CONCURRENT, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLimit(0));
    }
}
