mod error;
pub use error::{ExecError, ExecResult};

pub mod safety;
pub use safety::{Refusal, is_command_safe};

pub mod shell;
pub use shell::{SafetyMode, ShellConfig, ShellOutput, ShellRunner};

mod service;
pub use service::{CommandRun, ShellService};

mod util;

pub mod prelude {
    pub use crate::error::{ExecError, ExecResult};
    pub use crate::service::{CommandRun, ShellService};
    pub use crate::shell::{SafetyMode, ShellConfig, ShellOutput, ShellRunner};
}
