//! Network byte counters from /proc/net/dev.

use super::InterfaceCounters;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Loopback interfaces are named `lo` or start with it (`lo0`, `Loopback`)
pub fn is_loopback(interface: &str) -> bool {
    interface.to_lowercase().starts_with("lo")
}

/// Read cumulative counters for every non-loopback interface
pub fn read_interfaces(proc_root: &Path) -> Result<Vec<InterfaceCounters>> {
    let path = proc_root.join("net").join("dev");
    let netdev = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_net_dev(&netdev))
}

pub fn parse_net_dev(netdev: &str) -> Vec<InterfaceCounters> {
    let mut interfaces = Vec::new();

    for line in netdev.lines() {
        // Header lines have no "iface:" prefix. Large counters can run into
        // the colon ("eth0:123"), so split on it rather than on whitespace.
        let Some((name, counters)) = line.split_once(':') else {
            continue;
        };
        let interface = name.trim();
        if interface.is_empty() || is_loopback(interface) {
            continue;
        }

        let parts: Vec<&str> = counters.split_whitespace().collect();
        if parts.len() < 16 {
            continue;
        }

        let (Ok(rx_bytes), Ok(tx_bytes)) = (parts[0].parse(), parts[8].parse()) else {
            continue;
        };

        interfaces.push(InterfaceCounters::new(interface, rx_bytes, tx_bytes));
    }

    interfaces
}
