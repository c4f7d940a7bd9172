//! netvakt entrypoint: live traffic monitoring with geolocation enrichment.

use clap::Parser;

use netvakt_telemetry::logging::EventLogger;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    EventLogger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(run_args) => commands::run_monitor(run_args).await,
        Commands::Devices => commands::list_devices(),
    }
}
