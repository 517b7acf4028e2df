//! Metric sources: point-in-time readings of host metrics.
//!
//! The sampler only talks to the [`MetricSource`] trait. [`ProcfsSource`]
//! is the Linux implementation backed by procfs and sysfs.

pub mod cpu;
pub mod memory;
pub mod network;
pub mod thermal;

#[cfg(test)]
pub mod fake;

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// One temperature sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Sensor key, e.g. "coretemp_package_id_0"
    pub label: String,
    pub celsius: f64,
}

impl SensorReading {
    pub fn new(label: impl Into<String>, celsius: f64) -> Self {
        Self {
            label: label.into(),
            celsius,
        }
    }
}

/// Cumulative byte counters for one network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters {
    /// Interface name (e.g., "eth0", "ens5")
    pub interface: String,
    /// Total bytes received
    pub rx_bytes: u64,
    /// Total bytes transmitted
    pub tx_bytes: u64,
}

impl InterfaceCounters {
    pub fn new(interface: impl Into<String>, rx_bytes: u64, tx_bytes: u64) -> Self {
        Self {
            interface: interface.into(),
            rx_bytes,
            tx_bytes,
        }
    }
}

/// Supplier of raw host readings. Each family is read independently so
/// one failing family never prevents the others from being sampled.
#[async_trait]
pub trait MetricSource: Send {
    /// CPU utilization percentage measured over `window`.
    /// Blocks the caller for the whole window.
    async fn cpu_percent(&mut self, window: Duration) -> Result<f64>;

    /// Virtual memory used percentage
    async fn memory_used_percent(&mut self) -> Result<f64>;

    /// All temperature sensors, CPU-related or not
    async fn temperatures(&mut self) -> Result<Vec<SensorReading>>;

    /// Cumulative counters for every non-loopback interface
    async fn interfaces(&mut self) -> Result<Vec<InterfaceCounters>>;
}

/// Linux source reading procfs and sysfs
#[derive(Debug, Clone)]
pub struct ProcfsSource {
    proc_root: PathBuf,
    sys_root: PathBuf,
}

impl ProcfsSource {
    pub fn new(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
        }
    }
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new("/proc", "/sys")
    }
}

#[async_trait]
impl MetricSource for ProcfsSource {
    async fn cpu_percent(&mut self, window: Duration) -> Result<f64> {
        let before = cpu::read_cpu_times(&self.proc_root)?;
        tokio::time::sleep(window).await;
        let after = cpu::read_cpu_times(&self.proc_root)?;
        Ok(cpu::utilization(&before, &after))
    }

    async fn memory_used_percent(&mut self) -> Result<f64> {
        memory::read_used_percent(&self.proc_root)
    }

    async fn temperatures(&mut self) -> Result<Vec<SensorReading>> {
        thermal::read_sensors(&self.sys_root)
    }

    async fn interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        network::read_interfaces(&self.proc_root)
    }
}
