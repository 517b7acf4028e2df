//! CPU utilization from /proc/stat.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Raw CPU time values from the aggregate `cpu` line of /proc/stat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Guest time is already included in user/nice, so it is left out here.
    pub fn total(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }

    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }
}

/// Read the aggregate CPU times from `<proc_root>/stat`
pub fn read_cpu_times(proc_root: &Path) -> Result<CpuTimes> {
    let path = proc_root.join("stat");
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let line = content
        .lines()
        .find(|line| line.starts_with("cpu "))
        .with_context(|| format!("No aggregate cpu line in {}", path.display()))?;

    parse_cpu_line(line)
}

fn parse_cpu_line(line: &str) -> Result<CpuTimes> {
    let parts: Vec<u64> = line
        .split_whitespace()
        .skip(1) // Skip "cpu"
        .map(|s| s.parse::<u64>())
        .collect::<Result<Vec<u64>, _>>()
        .with_context(|| format!("Malformed cpu line: {line}"))?;

    if parts.len() < 4 {
        bail!("Truncated cpu line: {line}");
    }

    Ok(CpuTimes {
        user: parts[0],
        nice: parts[1],
        system: parts[2],
        idle: parts[3],
        iowait: *parts.get(4).unwrap_or(&0),
        irq: *parts.get(5).unwrap_or(&0),
        softirq: *parts.get(6).unwrap_or(&0),
        steal: *parts.get(7).unwrap_or(&0),
    })
}

/// Busy percentage between two snapshots. No elapsed ticks means 0.0.
pub fn utilization(prev: &CpuTimes, curr: &CpuTimes) -> f64 {
    let total_delta = curr.total().saturating_sub(prev.total());
    if total_delta == 0 {
        return 0.0;
    }

    let idle_delta = curr.idle_total().saturating_sub(prev.idle_total());
    let busy = 1.0 - (idle_delta as f64 / total_delta as f64);
    (100.0 * busy).clamp(0.0, 100.0)
}
