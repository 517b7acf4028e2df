//! The report loop: sample once per tick, flush every reporting interval.
//!
//! The scheduler owns the current window's [`Aggregate`] and the network
//! [`CounterState`]; nothing else mutates them, so no locking is needed.
//! Shutdown is checked only between ticks, and a pending window is dropped
//! rather than flushed early.

use crate::aggregate::Aggregate;
use crate::display::WindowSummary;
use crate::metrics::MetricSource;
use crate::rate::CounterState;
use crate::sample;
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One tick per second; also the CPU measurement window
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Default reporting interval
pub const DEFAULT_REPORT_EVERY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Sampling,
    Flushing,
    Stopped,
}

/// Result of one flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was observed this window, no delivery attempted
    Skipped,
    Delivered,
    Failed,
}

pub struct ReportScheduler<S, T> {
    source: S,
    transport: T,
    report_every: Duration,
    aggregate: Aggregate,
    counters: CounterState,
    last_flush: Instant,
    window_started: DateTime<Utc>,
    state: State,
}

impl<S, T> ReportScheduler<S, T>
where
    S: MetricSource,
    T: Transport,
{
    pub fn new(source: S, transport: T, report_every: Duration) -> Self {
        Self {
            source,
            transport,
            report_every,
            aggregate: Aggregate::new(),
            counters: CounterState::new(),
            last_flush: Instant::now(),
            window_started: Utc::now(),
            state: State::Sampling,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The window currently accumulating
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn counters(&self) -> &CounterState {
        &self.counters
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run until `shutdown` reads `true`.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) {
        info!(
            target_url = %self.transport.target(),
            report_every_secs = self.report_every.as_secs(),
            "sampling started"
        );

        loop {
            if *shutdown.borrow() {
                self.state = State::Stopped;
                info!(
                    pending_metrics = self.aggregate.len(),
                    "shutdown requested, dropping partial window"
                );
                break;
            }

            self.tick().await;
        }
    }

    /// Sample every family once, then flush if the window has elapsed.
    ///
    /// A tick lasts at least [`SAMPLE_INTERVAL`] even when the CPU read fails
    /// before its measurement window.
    pub async fn tick(&mut self) -> Option<FlushOutcome> {
        let started = Instant::now();
        let reading = sample::acquire(&mut self.source, SAMPLE_INTERVAL).await;
        sample::record(&reading, &mut self.aggregate, &mut self.counters);
        tokio::time::sleep_until(started + SAMPLE_INTERVAL).await;

        if self.last_flush.elapsed() >= self.report_every {
            Some(self.flush().await)
        } else {
            None
        }
    }

    /// Hand the window to the transport and start a new one.
    ///
    /// The window is reset whatever the delivery outcome.
    pub async fn flush(&mut self) -> FlushOutcome {
        self.state = State::Flushing;
        let window = std::mem::take(&mut self.aggregate);

        let outcome = if window.is_empty() {
            debug!("empty window, nothing to deliver");
            FlushOutcome::Skipped
        } else {
            let summary = WindowSummary(&window).to_string();
            let metrics = window.len();
            match self.transport.deliver(window).await {
                Ok(()) => {
                    info!(
                        window_start = %self.window_started.to_rfc3339(),
                        metrics,
                        "{summary}"
                    );
                    FlushOutcome::Delivered
                }
                Err(e) => {
                    warn!(
                        endpoint = %self.transport.target(),
                        error = %e.cause_chain(),
                        "POST failed"
                    );
                    FlushOutcome::Failed
                }
            }
        };

        self.last_flush = Instant::now();
        self.window_started = Utc::now();
        self.state = State::Sampling;
        outcome
    }
}
