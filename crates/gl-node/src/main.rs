//! # GasLeap Node
//!
//! Runs the simulated sponsorship parachain.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags and layer configuration (defaults, `--config`, `GL_*`
//!    environment variables, flags)
//! 2. Initialize logging and metrics
//! 3. Seed the demo pool, bind HTTP and WebSocket, start the block producer
//! 4. Wait for Ctrl-C, then stop the producer and drain both servers

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use gl_03_rpc_gateway::GatewayService;
use gl_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

use crate::settings::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry =
        init_telemetry(&TelemetryConfig::from_env()).context("initializing telemetry")?;

    let config = settings::load(&cli, |key| std::env::var(key).ok())?;
    info!(
        chain = %config.chain.name,
        http_port = config.http.port,
        ws_port = config.websocket.port,
        block_time_ms = config.chain.block_time.as_millis() as u64,
        "Starting GasLeap node"
    );

    let gateway = GatewayService::new(config)
        .context("creating gateway")?
        .start()
        .await
        .context("starting gateway")?;

    info!("Node running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    gateway.shutdown().await;
    Ok(())
}
