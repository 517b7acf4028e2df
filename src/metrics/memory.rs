//! Memory utilization from /proc/meminfo.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Read `<proc_root>/meminfo` and return the used percentage
pub fn read_used_percent(proc_root: &Path) -> Result<f64> {
    let path = proc_root.join("meminfo");
    let meminfo = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_used_percent(&meminfo)
}

/// Used memory excludes buffers and page cache.
pub fn parse_used_percent(meminfo: &str) -> Result<f64> {
    let mut total: u64 = 0;
    let mut free: u64 = 0;
    let mut buffers: u64 = 0;
    let mut cached: u64 = 0;

    for line in meminfo.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let slot = match parts[0] {
            "MemTotal:" => &mut total,
            "MemFree:" => &mut free,
            "Buffers:" => &mut buffers,
            "Cached:" => &mut cached,
            _ => continue,
        };
        // kB
        *slot = parts[1]
            .parse()
            .with_context(|| format!("Malformed meminfo line: {line}"))?;
    }

    if total == 0 {
        bail!("MemTotal missing or zero in meminfo");
    }

    let used = total.saturating_sub(free.saturating_add(buffers).saturating_add(cached));
    Ok(100.0 * used as f64 / total as f64)
}
