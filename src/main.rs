//! sysmetrics agent binary.
//!
//! Runs the report loop on a single thread until SIGINT or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use sysmetrics::config::Args;
use sysmetrics::metrics::ProcfsSource;
use sysmetrics::scheduler::ReportScheduler;
use sysmetrics::transport::HttpTransport;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config()?;
    let source = ProcfsSource::new(&config.proc_root, &config.sys_root);
    let transport = HttpTransport::new(config.endpoint(), config.timeout)
        .context("Failed to set up collector transport")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(wait_for_shutdown(shutdown_tx));

    let mut scheduler = ReportScheduler::new(source, transport, config.report_every);
    scheduler.run(shutdown_rx).await;

    info!("sysmetrics stopped");
    Ok(())
}

/// Flip the shutdown flag on Ctrl-C or SIGTERM
async fn wait_for_shutdown(tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received, stopping after the current tick");
    let _ = tx.send(true);
}
