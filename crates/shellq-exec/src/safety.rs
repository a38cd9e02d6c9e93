//! Allow-list filter applied to shell commands before they are spawned.
//!
//! A command is refused when it contains a known-destructive snippet, matches
//! one of the risky patterns, or does not start with an allow-listed program.
use std::{fmt, sync::LazyLock};

use regex::Regex;

const DANGEROUS_SNIPPETS: &[&str] = &[
    "rm -rf /",
    ":(){ :|:& };:",
    "chmod -R 777 /",
    "dd if=/dev/zero of=/dev/sda",
    "mkfs",
    "fdisk",
    "shutdown",
    "reboot",
    "halt",
    "poweroff",
];

const RISKY_PATTERNS: &[&str] = &[
    r"rm\s+.*-rf",
    r"chmod\s+.*777",
    r">",
    r"\|",
    r"sudo",
    r"su\s",
    r"passwd",
    r"useradd",
    r"userdel",
    r"systemctl",
    r"service",
];

const ALLOWED_PROGRAMS: &[&str] = &[
    "ls", "cat", "pwd", "echo", "grep", "find", "head", "tail", "sort", "wc", "touch", "mkdir",
    "cp", "mv", "rm", "chmod", "chown", "git", "npm", "node", "python", "python3", "pip", "curl",
    "wget", "tar", "gzip", "gunzip", "zip", "unzip",
];

static RISKY: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    RISKY_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok().map(|re| (*p, re)))
        .collect()
});

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    Dangerous(&'static str),
    RiskyPattern(&'static str),
    NotAllowed(String),
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::Dangerous(snippet) => write!(f, "contains {snippet:?}"),
            Refusal::RiskyPattern(pattern) => write!(f, "matches /{pattern}/"),
            Refusal::NotAllowed(program) if program.is_empty() => f.write_str("empty command"),
            Refusal::NotAllowed(program) => write!(f, "{program:?} is not an allowed program"),
        }
    }
}

/// First reason to refuse `command`, if any.
pub fn refusal(command: &str) -> Option<Refusal> {
    if let Some(snippet) = DANGEROUS_SNIPPETS.iter().copied().find(|s| command.contains(s)) {
        return Some(Refusal::Dangerous(snippet));
    }
    if let Some((pattern, _)) = RISKY.iter().find(|(_, re)| re.is_match(command)) {
        return Some(Refusal::RiskyPattern(*pattern));
    }

    // Leading whitespace and tabs are skipped before the program name.
    let program = command.split_whitespace().next().unwrap_or_default();
    if !ALLOWED_PROGRAMS.contains(&program) {
        return Some(Refusal::NotAllowed(program.to_string()));
    }
    None
}

#[inline]
pub fn is_command_safe(command: &str) -> bool {
    refusal(command).is_none()
}
