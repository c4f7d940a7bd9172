use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use netvakt_capture::{live, LivePacketSource};
use netvakt_config::NetvaktConfig;
use netvakt_engine::MonitorRuntime;
use netvakt_enrich::IpApiClient;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitor live traffic on an interface
    Run(RunArgs),
    /// List capture-capable devices on this host
    Devices,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Interface to monitor; overrides the configured one
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Configuration file (defaults to config/netvakt.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Interval between snapshot log lines.
const SNAPSHOT_PERIOD: Duration = Duration::from_secs(2);

pub async fn run_monitor(args: RunArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = match args.config {
        Some(path) => NetvaktConfig::load_from_path(path)?,
        None => NetvaktConfig::load()?,
    };
    if let Some(interface) = args.interface {
        config.capture.interface = interface;
    }

    let source = Arc::new(LivePacketSource::new(
        config.capture.buffer_size,
        config.capture.promiscuous,
    ));
    let lookup = Arc::new(IpApiClient::new(
        config.enrich.endpoint.clone(),
        Duration::from_millis(config.enrich.timeout_ms),
    ));

    let runtime = Arc::new(MonitorRuntime::new(config, source, lookup));

    // Snapshot poller: periodic status lines until shutdown.
    let poller = {
        let runtime = Arc::clone(&runtime);
        tokio::spawn(async move {
            while runtime.state().is_running() {
                tokio::time::sleep(SNAPSHOT_PERIOD).await;
                let snap = runtime.snapshot();
                info!(
                    risk = snap.risk_score,
                    pps = snap.current_pps(),
                    packets = snap.packet_count,
                    geo_records = snap.geo_records.len(),
                    heartbeat = %snap.heartbeat,
                    high_risk = snap.is_high_risk(),
                    "monitor status"
                );
            }
        })
    };

    // Ctrl-C is the settings controller here: it flips the running flag and
    // lets every loop wind down cooperatively.
    let signal_runtime = Arc::clone(&runtime);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_runtime.shutdown();
        }
    });

    Arc::clone(&runtime).run().await?;
    let _ = poller.await;

    match runtime.metrics().gather_metrics() {
        Ok(metrics) => info!("final metrics:\n{metrics}"),
        Err(e) => warn!("failed to gather metrics: {e}"),
    }
    Ok(())
}

pub fn list_devices() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for name in live::list_devices()? {
        println!("{name}");
    }
    Ok(())
}
