//! Send a message to the peer.

use anyhow::{Context, Result};
use pairlink_client::{PairingContext, Transport};
use pairlink_relay::Relay;
use std::path::Path;

use crate::config::{load_relay_config, PairingConfig};

/// Run the send command.
pub async fn run(
    data_dir: &Path,
    relay_config: Option<&Path>,
    message: &[u8],
    alert: Option<&str>,
) -> Result<()> {
    let pairing = PairingConfig::load(data_dir).await?.to_pairing()?;
    let relay = Relay::open(load_relay_config(data_dir, relay_config)?)
        .await
        .context("Failed to open relay")?;
    let transport = relay.transport();

    let sent = match alert {
        Some(text) => transport.push_alert(&pairing, text, message).await,
        None => transport.send_message(&pairing, message).await,
    };
    sent.context("Failed to send message")?;

    println!(
        "Sent {} byte(s) to {}.",
        message.len(),
        pairing.send_queue_name()
    );
    if pairing.push_endpoint().is_none() {
        println!("  No push endpoint registered; the peer will see it on its next read.");
    }
    Ok(())
}
