//! Read one batch of messages from the peer.

use anyhow::{Context, Result};
use pairlink_client::{PairingContext, Transport};
use pairlink_relay::Relay;
use std::path::Path;

use crate::config::{load_relay_config, PairingConfig};
use crate::notifier::TerminalNotifier;

/// Run the read command.
pub async fn run(data_dir: &Path, relay_config: Option<&Path>) -> Result<()> {
    let pairing = PairingConfig::load(data_dir).await?.to_pairing()?;
    let relay = Relay::open(load_relay_config(data_dir, relay_config)?)
        .await
        .context("Failed to open relay")?;

    let ciphertexts = relay
        .transport()
        .read(Some(&TerminalNotifier), &pairing)
        .await
        .with_context(|| format!("Failed to read {}", pairing.recv_queue_name()))?;

    if ciphertexts.is_empty() {
        println!("No new messages.");
        return Ok(());
    }

    println!("Received {} message(s):", ciphertexts.len());
    for ciphertext in &ciphertexts {
        match pairing.decrypt(ciphertext) {
            Ok(plaintext) => match String::from_utf8(plaintext) {
                Ok(text) => println!("  {}", text),
                Err(e) => println!("  <binary {} bytes>", e.as_bytes().len()),
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to decrypt message");
                println!("  <undecryptable {} bytes>", ciphertext.len());
            }
        }
    }
    Ok(())
}
