use serde::{Deserialize, Serialize};
use shellq_model::CommandStatus;

/// Captured result of a finished shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ShellOutput {
    #[inline]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Text to show the user: stdout, or stderr when stdout is empty.
    pub fn text(&self) -> &str {
        if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }

    pub fn status(&self) -> CommandStatus {
        if self.success() {
            CommandStatus::Completed
        } else {
            CommandStatus::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_prefers_stdout() {
        let out = ShellOutput {
            stdout: "files\n".into(),
            stderr: "warning\n".into(),
            exit_code: 0,
        };
        assert_eq!(out.text(), "files\n");
        assert_eq!(out.status(), CommandStatus::Completed);
    }

    #[test]
    fn text_falls_back_to_stderr() {
        let out = ShellOutput {
            stdout: String::new(),
            stderr: "no such file\n".into(),
            exit_code: 2,
        };
        assert_eq!(out.text(), "no such file\n");
        assert!(!out.success());
        assert_eq!(out.status(), CommandStatus::Error);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&ShellOutput::default()).unwrap();
        assert_eq!(json, r#"{"stdout":"","stderr":"","exitCode":0}"#);
    }
}
