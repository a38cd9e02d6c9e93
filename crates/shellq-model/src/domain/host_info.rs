use serde::{Deserialize, Serialize};

/// Host facts served next to the queue load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    /// Human-readable OS name, e.g. `Debian GNU/Linux 12 (bookworm)`.
    pub os: String,
    /// OS family: `linux`, `macos`, `windows`, ...
    pub platform: String,
    pub arch: String,
    /// Seconds since the process marked its start.
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let info = HostInfo {
            os: "Alpine Linux v3.20".into(),
            platform: "linux".into(),
            arch: "x86_64".into(),
            uptime_seconds: 42,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["uptimeSeconds"], 42);
        assert_eq!(json["platform"], "linux");
    }
}
