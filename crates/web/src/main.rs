//! CO2 footprint calculator web server.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use co2calc_core::{EmissionFactorTable, EmissionsCalculator};
use co2calc_web::{init_logging, start_server, AppState, WebConfig};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "co2calc")]
#[command(about = "Household CO2 footprint calculator")]
#[command(version)]
struct Cli {
    /// Bind address (overrides config and CO2CALC_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config and CO2CALC_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = WebConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.host, cli.port, cli.debug);
    init_logging(&config)?;

    let factors = EmissionFactorTable::STANDARD;
    debug!(?factors, "emission factors");
    let state = AppState::new(EmissionsCalculator::new(factors));

    let addr = config.bind_addr();
    info!("🌱 CO2 calculator starting on {}", addr);
    start_server(state, &addr).await
}
