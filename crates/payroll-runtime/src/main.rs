//! # Payroll Client Core
//!
//! Runs the wired client core against in-memory adapters. Configuration
//! comes from the environment; the contract address is mandatory and the
//! process refuses to start without it.

use anyhow::{Context, Result};
use payroll_runtime::{logging, AppConfig, InMemoryApp};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(contract = %config.contract_address, "Configuration loaded");

    let rig = InMemoryApp::new(&config);
    let _coordinator = rig.app.start();

    info!("Payroll client core is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down");
    Ok(())
}
