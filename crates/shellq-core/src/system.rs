//! Host facts for the status report.
use std::{sync::OnceLock, time::Instant};

use shellq_model::HostInfo;

static STARTED: OnceLock<Instant> = OnceLock::new();

/// Record the process start. Only the first call counts; call it early in `main`.
pub fn mark_started() {
    STARTED.get_or_init(Instant::now);
}

/// Current host snapshot.
///
/// Uptime counts from [`mark_started`], or from this call if it never ran.
pub fn host_info() -> HostInfo {
    let started = STARTED.get_or_init(Instant::now);
    HostInfo {
        os: os_name(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        uptime_seconds: started.elapsed().as_secs(),
    }
}

fn os_name() -> String {
    #[cfg(target_os = "linux")]
    {
        let release = std::fs::read_to_string("/etc/os-release").ok();
        if let Some(name) = release.as_deref().and_then(pretty_name) {
            return name;
        }
    }

    std::env::consts::OS.to_string()
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|name| name.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
