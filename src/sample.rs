//! One tick of sampling: acquire every metric family best-effort, then fold
//! the successful readings into the window's aggregate.

use crate::aggregate::{
    Aggregate, CPU_PERCENT, CPU_TEMP_C, MEM_USED_PERCENT, NET_RECV_BYTES_PER_SEC,
    NET_SENT_BYTES_PER_SEC,
};
use crate::metrics::{MetricSource, SensorReading};
use crate::rate::{CounterState, NetTotals};
use std::time::Duration;
use tracing::warn;

/// Substrings identifying CPU die/package sensors
const CPU_SENSOR_KEYWORDS: &[&str] = &["cpu", "package", "coretemp", "tdie", "tctl", "cpu_thermal"];

/// Readings taken during one tick. `None` means the family was skipped
/// (read failed, or no CPU sensor matched) and contributes no observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub cpu_percent: Option<f64>,
    pub mem_used_percent: Option<f64>,
    pub cpu_temp_c: Option<f64>,
    pub net: Option<NetTotals>,
}

fn best_effort<T>(family: &'static str, reading: anyhow::Result<T>) -> Option<T> {
    match reading {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(family, error = %format!("{e:#}"), "metric read failed");
            None
        }
    }
}

/// Read all four families from `source`. The CPU read blocks for `window`.
pub async fn acquire<S>(source: &mut S, window: Duration) -> Sample
where
    S: MetricSource + ?Sized,
{
    let cpu_percent = best_effort("cpu", source.cpu_percent(window).await);
    let mem_used_percent = best_effort("memory", source.memory_used_percent().await);
    let cpu_temp_c = best_effort("temperature", source.temperatures().await)
        .and_then(|sensors| cpu_temperature(&sensors));
    let net = best_effort("network", source.interfaces().await)
        .map(|interfaces| NetTotals::from_interfaces(&interfaces));

    Sample {
        cpu_percent,
        mem_used_percent,
        cpu_temp_c,
        net,
    }
}

fn is_cpu_sensor(label: &str) -> bool {
    let label = label.to_lowercase();
    CPU_SENSOR_KEYWORDS.iter().any(|kw| label.contains(kw))
}

/// Mean over CPU-related sensors, `None` if none matched
pub fn cpu_temperature(sensors: &[SensorReading]) -> Option<f64> {
    let matched: Vec<f64> = sensors
        .iter()
        .filter(|s| is_cpu_sensor(&s.label))
        .map(|s| s.celsius)
        .collect();

    if matched.is_empty() {
        return None;
    }
    Some(matched.iter().sum::<f64>() / matched.len() as f64)
}

/// Fold a sample into the aggregate.
///
/// Network totals go through the counter state: the first reading only
/// primes it, and a failed read drops the baseline.
pub fn record(sample: &Sample, aggregate: &mut Aggregate, counters: &mut CounterState) {
    if let Some(pct) = sample.cpu_percent {
        aggregate.add(CPU_PERCENT, pct);
    }
    if let Some(pct) = sample.mem_used_percent {
        aggregate.add(MEM_USED_PERCENT, pct);
    }
    if let Some(temp) = sample.cpu_temp_c {
        aggregate.add(CPU_TEMP_C, temp);
    }

    match sample.net {
        Some(totals) => {
            if let Some(rates) = counters.observe(totals) {
                aggregate.add(NET_RECV_BYTES_PER_SEC, rates.recv_bytes_per_sec);
                aggregate.add(NET_SENT_BYTES_PER_SEC, rates.sent_bytes_per_sec);
            }
        }
        None => counters.reset(),
    }
}
