//! proping Binary Entry Point
//!
//! Validates the target host, starts the monitor and prints one line per
//! driver tick. Core functionality is provided by the `proping` library crate.

use std::time::Duration;

use clap::Parser;
use proping::{
    AppConfig, Monitor, MonitorError, Resolution, Snapshot, config::parse_duration,
    monitor::format_uptime,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// proping - Sub-second Packet Loss Monitor
#[derive(Parser, Debug)]
#[command(name = "proping", version, about, long_about = None)]
struct Cli {
    /// Host to monitor (hostname or IP address)
    host: String,

    /// Path to configuration file
    #[arg(short, long, env = "PROPING_CONFIG")]
    config: Option<String>,

    /// Probes per second (overrides config file)
    #[arg(short, long, env = "PROPING_FREQUENCY")]
    frequency: Option<u32>,

    /// Per-probe timeout, e.g. "2s" (overrides config file)
    #[arg(long, env = "PROPING_TIMEOUT", value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Emit each snapshot as a JSON line instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,proping=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file, or fall back to defaults
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(frequency) = cli.frequency {
        config.probe.frequency = frequency;
    }
    if let Some(timeout) = cli.timeout {
        config.probe.ping.timeout = timeout;
    }

    let monitor = match Monitor::with_ping(config, &cli.host).await {
        Ok(monitor) => monitor,
        Err(e @ MonitorError::HostUnresolvable { .. }) => {
            tracing::error!("{}", e);
            eprintln!(
                "Error: The hostname '{}' could not be resolved. Please provide a valid hostname or IP address.",
                cli.host
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Press Ctrl+C to shutdown");

    let mut updates = monitor.subscribe();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if cli.json {
                    println!("{}", serde_json::to_string(&*snapshot)?);
                } else {
                    println!("{}", summary_line(&snapshot));
                }
            }
        }
    }

    let report = monitor.shutdown().await?;
    tracing::info!(
        joined = report.joined,
        abandoned = report.abandoned,
        "Shutdown complete"
    );
    Ok(())
}

/// One-line text rendering of a snapshot.
fn summary_line(snapshot: &Snapshot) -> String {
    let stats: Vec<String> = Resolution::ALL
        .iter()
        .map(|&resolution| {
            let s = snapshot.stats(resolution);
            format!("{} {:.1}%/{:.1}%", resolution, s.average, s.maximum)
        })
        .collect();

    format!(
        "loss now {:5.1}% | avg/max {} | samples {} | runtime {}",
        snapshot.instant_loss,
        stats.join("  "),
        snapshot.sample_count,
        format_uptime(snapshot.uptime)
    )
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
