//! Human-readable rendering of a reporting window for log lines.

use crate::aggregate::{
    Aggregate, CPU_PERCENT, CPU_TEMP_C, MEM_USED_PERCENT, NET_RECV_BYTES_PER_SEC,
    NET_SENT_BYTES_PER_SEC,
};
use std::fmt;

/// Format bytes per second
pub fn format_throughput(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    if bytes_per_sec >= GB {
        format!("{:.2} GB/s", bytes_per_sec / GB)
    } else if bytes_per_sec >= MB {
        format!("{:.2} MB/s", bytes_per_sec / MB)
    } else if bytes_per_sec >= KB {
        format!("{:.2} KB/s", bytes_per_sec / KB)
    } else {
        format!("{:.0} B/s", bytes_per_sec)
    }
}

/// Window means, e.g. `cpu 65.0% mem 42.0% temp 41.0C rx 1.50 KB/s tx 512 B/s`.
/// Metrics without observations are left out.
pub struct WindowSummary<'a>(pub &'a Aggregate);

impl fmt::Display for WindowSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agg = self.0;
        let mut parts = Vec::new();

        if let Some(cpu) = agg.mean(CPU_PERCENT) {
            parts.push(format!("cpu {:.1}%", cpu));
        }
        if let Some(mem) = agg.mean(MEM_USED_PERCENT) {
            parts.push(format!("mem {:.1}%", mem));
        }
        if let Some(temp) = agg.mean(CPU_TEMP_C) {
            parts.push(format!("temp {:.1}C", temp));
        }
        if let Some(rx) = agg.mean(NET_RECV_BYTES_PER_SEC) {
            parts.push(format!("rx {}", format_throughput(rx)));
        }
        if let Some(tx) = agg.mean(NET_SENT_BYTES_PER_SEC) {
            parts.push(format!("tx {}", format_throughput(tx)));
        }

        if parts.is_empty() {
            write!(f, "empty window")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
