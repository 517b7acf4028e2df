//! Rate derivation for monotonic network byte counters.

use crate::metrics::InterfaceCounters;

/// Cumulative byte counters summed over all reported interfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetTotals {
    pub recv_bytes: u64,
    pub sent_bytes: u64,
}

impl NetTotals {
    pub fn new(recv_bytes: u64, sent_bytes: u64) -> Self {
        Self {
            recv_bytes,
            sent_bytes,
        }
    }

    /// Sum per-interface counters into host totals
    pub fn from_interfaces(interfaces: &[InterfaceCounters]) -> Self {
        interfaces.iter().fold(Self::default(), |acc, iface| Self {
            recv_bytes: acc.recv_bytes.saturating_add(iface.rx_bytes),
            sent_bytes: acc.sent_bytes.saturating_add(iface.tx_bytes),
        })
    }
}

/// Per-tick throughput derived from two successive readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetRates {
    pub recv_bytes_per_sec: f64,
    pub sent_bytes_per_sec: f64,
}

/// Last-seen counter values. Lives across reporting windows.
#[derive(Debug, Default)]
pub struct CounterState {
    previous: Option<NetTotals>,
}

impl CounterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    pub fn previous(&self) -> Option<NetTotals> {
        self.previous
    }

    /// Record a new reading and return the rates since the previous one.
    ///
    /// Returns `None` when un-primed: the reading only becomes the baseline.
    pub fn observe(&mut self, current: NetTotals) -> Option<NetRates> {
        let rates = self.previous.map(|prev| NetRates {
            recv_bytes_per_sec: counter_delta(prev.recv_bytes, current.recv_bytes) as f64,
            sent_bytes_per_sec: counter_delta(prev.sent_bytes, current.sent_bytes) as f64,
        });
        self.previous = Some(current);
        rates
    }

    /// Drop the baseline after a failed read so the next reading primes again
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Delta between two counter readings; a counter that went backwards
/// (wrap, reset, interface replaced) yields zero.
pub fn counter_delta(previous: u64, current: u64) -> u64 {
    current.saturating_sub(previous)
}
