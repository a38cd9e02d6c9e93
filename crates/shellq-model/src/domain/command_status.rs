use serde::{Deserialize, Serialize};

/// Lifecycle state of a command request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandStatus {
    /// Accepted, waiting for a free slot.
    #[default]
    Pending,
    /// Admitted and executing.
    Running,
    /// Finished with a zero exit code (or an answered natural-language request).
    Completed,
    /// Finished with a non-zero exit code or failed to run at all.
    Error,
}

impl CommandStatus {
    /// Returns `true` if the command will not transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommandStatus::Completed | CommandStatus::Error)
    }

    /// Short lower-case label used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "pending",
            CommandStatus::Running => "running",
            CommandStatus::Completed => "completed",
            CommandStatus::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(CommandStatus::Completed.is_terminal());
        assert!(CommandStatus::Error.is_terminal());

        assert!(!CommandStatus::Pending.is_terminal());
        assert!(!CommandStatus::Running.is_terminal());
    }

    #[test]
    fn default_is_pending() {
        assert_eq!(CommandStatus::default(), CommandStatus::Pending);
    }

    #[test]
    fn serde_uses_lower_case() {
        let json = serde_json::to_string(&CommandStatus::Completed).unwrap();
        assert_eq!(json, r#""completed""#);
        assert_eq!(CommandStatus::Completed.as_str(), "completed");

        let back: CommandStatus = serde_json::from_str(r#""error""#).unwrap();
        assert_eq!(back, CommandStatus::Error);
    }
}
