use super::{InterfaceCounters, MetricSource, SensorReading};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

/// Scripted source for scheduler tests. Each call pops the next entry of its
/// family; `None` entries and an exhausted script read as failures.
#[derive(Debug, Default)]
pub struct FakeSource {
    cpu: VecDeque<Option<f64>>,
    memory: VecDeque<Option<f64>>,
    temperatures: VecDeque<Option<Vec<SensorReading>>>,
    interfaces: VecDeque<Option<Vec<InterfaceCounters>>>,
    cpu_reads: usize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cpu(mut self, script: impl IntoIterator<Item = Option<f64>>) -> Self {
        self.cpu.extend(script);
        self
    }

    pub fn with_memory(mut self, script: impl IntoIterator<Item = Option<f64>>) -> Self {
        self.memory.extend(script);
        self
    }

    pub fn with_temperatures(
        mut self,
        script: impl IntoIterator<Item = Option<Vec<SensorReading>>>,
    ) -> Self {
        self.temperatures.extend(script);
        self
    }

    /// Script host totals as a single `eth0` interface per tick
    pub fn with_net_totals(mut self, script: impl IntoIterator<Item = Option<(u64, u64)>>) -> Self {
        self.interfaces.extend(script.into_iter().map(|entry| {
            entry.map(|(rx, tx)| vec![InterfaceCounters::new("eth0", rx, tx)])
        }));
        self
    }

    /// Number of CPU reads, i.e. ticks sampled so far
    pub fn cpu_reads(&self) -> usize {
        self.cpu_reads
    }
}

fn next<T>(script: &mut VecDeque<Option<T>>, family: &str) -> Result<T> {
    script
        .pop_front()
        .flatten()
        .ok_or_else(|| anyhow!("scripted {family} failure"))
}

#[async_trait]
impl MetricSource for FakeSource {
    /// Successful reads block for the window; failures return at once, like
    /// an unreadable /proc/stat.
    async fn cpu_percent(&mut self, window: Duration) -> Result<f64> {
        self.cpu_reads += 1;
        let pct = next(&mut self.cpu, "cpu")?;
        tokio::time::sleep(window).await;
        Ok(pct)
    }

    async fn memory_used_percent(&mut self) -> Result<f64> {
        next(&mut self.memory, "memory")
    }

    async fn temperatures(&mut self) -> Result<Vec<SensorReading>> {
        next(&mut self.temperatures, "temperature")
    }

    async fn interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        next(&mut self.interfaces, "network")
    }
}
