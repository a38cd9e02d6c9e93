use std::time::Duration;

/// Default wall-clock limit for one shell command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on captured bytes, per stream.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Whether the [`safety`](crate::safety) filter runs before spawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafetyMode {
    #[default]
    Enforce,
    Off,
}

impl SafetyMode {
    #[inline]
    pub fn is_enforced(self) -> bool {
        matches!(self, SafetyMode::Enforce)
    }
}

/// Settings shared by every command a [`ShellRunner`](super::ShellRunner) spawns.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub timeout: Duration,
    /// Output beyond this many bytes on stdout or stderr aborts the command.
    pub max_output_bytes: usize,
    pub safety: SafetyMode,
    /// Extra environment variables, applied on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Report a non-zero exit as [`ExecError::NonZeroExit`](crate::ExecError::NonZeroExit)
    /// instead of returning the output.
    pub fail_on_non_zero: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            safety: SafetyMode::Enforce,
            env: Vec::new(),
            fail_on_non_zero: false,
        }
    }
}

impl ShellConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    pub fn with_safety(mut self, safety: SafetyMode) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_fail_on_non_zero(mut self, fail: bool) -> Self {
        self.fail_on_non_zero = fail;
        self
    }
}
