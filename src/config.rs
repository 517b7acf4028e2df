//! Command-line configuration.

use crate::scheduler::DEFAULT_REPORT_EVERY;
use crate::transport::DEFAULT_TIMEOUT;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Host telemetry agent: samples CPU, memory, temperature and network once a
/// second and pushes windowed aggregates to a collector
#[derive(Parser, Debug, Clone)]
#[command(name = "sysmetrics")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Reporting interval in seconds
    #[arg(short, long, default_value_t = DEFAULT_REPORT_EVERY.as_secs())]
    pub report: u64,

    /// Collector hostname
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// Collector port
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Delivery timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// procfs mount point
    #[arg(long, default_value = "/proc")]
    pub proc_root: PathBuf,

    /// sysfs mount point
    #[arg(long, default_value = "/sys")]
    pub sys_root: PathBuf,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--report must be at least 1 second")]
    ZeroReportInterval,
    #[error("--timeout must be at least 1 second")]
    ZeroTimeout,
    #[error("--host must not be empty")]
    EmptyHost,
}

/// Validated agent settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub report_every: Duration,
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub proc_root: PathBuf,
    pub sys_root: PathBuf,
}

impl AgentConfig {
    /// Collector URL, `http://<host>:<port>/metric`
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/metric", self.host, self.port)
    }
}

impl Args {
    pub fn into_config(self) -> Result<AgentConfig, ConfigError> {
        if self.report == 0 {
            return Err(ConfigError::ZeroReportInterval);
        }
        if self.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        Ok(AgentConfig {
            report_every: Duration::from_secs(self.report),
            host: self.host,
            port: self.port,
            timeout: Duration::from_secs(self.timeout),
            proc_root: self.proc_root,
            sys_root: self.sys_root,
        })
    }
}
