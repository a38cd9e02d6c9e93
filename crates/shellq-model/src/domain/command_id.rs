use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

/// Identifier of a single command request.
///
/// Used by the queue for running-set membership only; it carries no ordering meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for CommandId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing [`CommandId`] source.
///
/// The first id handed out is `1`. Safe to share between tasks.
#[derive(Debug)]
pub struct CommandIdGen {
    next: AtomicU64,
}

impl CommandIdGen {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start counting from `first` (e.g. after restoring history elsewhere).
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self) -> CommandId {
        CommandId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CommandIdGen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_starts_at_one_and_increments() {
        let ids = CommandIdGen::new();
        assert_eq!(ids.next_id(), CommandId::new(1));
        assert_eq!(ids.next_id(), CommandId::new(2));
        assert_eq!(ids.next_id().get(), 3);
    }

    #[test]
    fn gen_starting_at_custom_value() {
        let ids = CommandIdGen::starting_at(40);
        assert_eq!(ids.next_id().get(), 40);
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(CommandId::from(7).to_string(), "7");
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&CommandId::new(12)).unwrap();
        assert_eq!(json, "12");

        let back: CommandId = serde_json::from_str("12").unwrap();
        assert_eq!(back, CommandId::new(12));
    }
}
