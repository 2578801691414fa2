//! Provision the pairing's queues.

use anyhow::{Context, Result};
use pairlink_client::{PairingContext, Transport};
use pairlink_relay::Relay;
use std::path::Path;

use crate::config::{load_relay_config, PairingConfig};

/// Run the setup command.
pub async fn run(data_dir: &Path, relay_config: Option<&Path>) -> Result<()> {
    let pairing = PairingConfig::load(data_dir).await?.to_pairing()?;
    let relay = Relay::open(load_relay_config(data_dir, relay_config)?)
        .await
        .context("Failed to open relay")?;

    relay
        .transport()
        .setup(&pairing)
        .await
        .context("Failed to provision queues")?;

    println!("Queues ready:");
    println!("  send: {}", pairing.send_queue_name());
    println!("  recv: {}", pairing.recv_queue_name());
    Ok(())
}
