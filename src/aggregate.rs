//! Windowed aggregation of metric observations.
//!
//! Every observation is folded into a running `(count, sum)` pair keyed by
//! metric name. The stored value is always the sum; consumers divide by the
//! count to get a mean.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CPU utilization percentage
pub const CPU_PERCENT: &str = "system.cpu.percent";
/// Virtual memory used percentage
pub const MEM_USED_PERCENT: &str = "system.mem.used_percent";
/// Mean CPU temperature in degrees Celsius
pub const CPU_TEMP_C: &str = "system.cpu.temp_c";
/// Bytes received per second across non-loopback interfaces
pub const NET_RECV_BYTES_PER_SEC: &str = "system.net.recv_bytes_per_sec";
/// Bytes sent per second across non-loopback interfaces
pub const NET_SENT_BYTES_PER_SEC: &str = "system.net.sent_bytes_per_sec";

/// A single aggregated metric. `count` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Number of samples folded in
    pub count: u64,
    /// Sum of the folded sample values
    pub value: f64,
}

impl Metric {
    pub fn mean(&self) -> f64 {
        self.value / self.count as f64
    }
}

/// Metrics collected during one reporting window.
///
/// Serializes as a plain JSON object keyed by metric name, which is the
/// collector's wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aggregate {
    metrics: BTreeMap<String, Metric>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into the metric called `name`.
    pub fn add(&mut self, name: &str, value: f64) {
        match self.metrics.get_mut(name) {
            Some(metric) => {
                metric.count += 1;
                metric.value += value;
            }
            None => {
                self.metrics
                    .insert(name.to_string(), Metric { count: 1, value });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }

    /// Mean of the observations for `name`, if any were recorded
    pub fn mean(&self, name: &str) -> Option<f64> {
        self.get(name).map(Metric::mean)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Iterate metrics in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Metric)> {
        self.metrics.iter().map(|(name, metric)| (name.as_str(), metric))
    }
}
