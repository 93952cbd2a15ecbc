//! Process memory sampling for metrics snapshots.

use serde::{Deserialize, Serialize};

/// Resident and virtual memory of this process, in bytes.
///
/// Both fields read as zero on platforms without `/proc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss: u64,
    pub virtual_size: u64,
}

impl MemoryUsage {
    /// Sample the current process.
    pub fn current() -> Self {
        std::fs::read_to_string("/proc/self/status")
            .map(|status| Self::parse_proc_status(&status))
            .unwrap_or_default()
    }

    fn parse_proc_status(status: &str) -> Self {
        let mut usage = Self::default();
        for line in status.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                usage.rss = parse_kib(rest);
            } else if let Some(rest) = line.strip_prefix("VmSize:") {
                usage.virtual_size = parse_kib(rest);
            }
        }
        usage
    }

    /// Resident set size rounded to whole mebibytes.
    pub fn rss_mb(&self) -> u64 {
        (self.rss as f64 / (1024.0 * 1024.0)).round() as u64
    }
}

// "   12345 kB" -> bytes
fn parse_kib(field: &str) -> u64 {
    field
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u64>().ok())
        .map(|kib| kib * 1024)
        .unwrap_or(0)
}
