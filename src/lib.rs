//! sysmetrics - a lightweight host telemetry agent.
//!
//! Samples CPU, memory, CPU temperature and network throughput once a
//! second, aggregates the samples over a reporting window and POSTs the
//! window as JSON to a remote collector.

pub mod aggregate;
pub mod config;
pub mod display;
pub mod metrics;
pub mod rate;
pub mod sample;
pub mod scheduler;
pub mod transport;
