use std::{fmt, str::FromStr};

use crate::logger::error::LoggerError;

/// Where and how log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerFormat {
    /// Human-readable lines on stderr.
    #[default]
    Text,
    /// One JSON object per line on stderr.
    Json,
    /// Native journald records (Linux, `journald` feature).
    Journald,
}

impl LoggerFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }

    /// Only plain text on a terminal gets ANSI colour.
    pub fn supports_color(self) -> bool {
        matches!(self, LoggerFormat::Text)
    }

    fn journald() -> Result<Self, LoggerError> {
        if cfg!(all(target_os = "linux", feature = "journald")) {
            Ok(LoggerFormat::Journald)
        } else {
            Err(LoggerError::JournaldUnavailable)
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("text") {
            Ok(LoggerFormat::Text)
        } else if name.eq_ignore_ascii_case("json") {
            Ok(LoggerFormat::Json)
        } else if name.eq_ignore_ascii_case("journald") {
            LoggerFormat::journald()
        } else {
            Err(LoggerError::UnknownFormat(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats_case_insensitively() {
        assert_eq!("text".parse::<LoggerFormat>(), Ok(LoggerFormat::Text));
        assert_eq!(" JSON ".parse::<LoggerFormat>(), Ok(LoggerFormat::Json));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for format in [LoggerFormat::Text, LoggerFormat::Json] {
            assert_eq!(format.to_string().parse::<LoggerFormat>(), Ok(format));
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert_eq!(
            "xml".parse::<LoggerFormat>(),
            Err(LoggerError::UnknownFormat("xml".into()))
        );
    }

    #[test]
    fn only_text_is_coloured() {
        assert!(LoggerFormat::Text.supports_color());
        assert!(!LoggerFormat::Json.supports_color());
        assert!(!LoggerFormat::Journald.supports_color());
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_requires_feature() {
        assert_eq!(
            "journald".parse::<LoggerFormat>(),
            Err(LoggerError::JournaldUnavailable)
        );
    }
}
